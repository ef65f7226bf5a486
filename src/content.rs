//! Reading Pelican-style markdown sources.
//!
//! A source file starts with `Key: value` header lines, ended by the first
//! blank line. Everything after is the body.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calfeed_core::{ContentItem, ContentKind, Metadata};

/// Directory whose files are pages rather than articles.
const PAGES_DIR: &str = "pages";

/// Load every `*.md` file under `root`, in path order.
pub fn load_dir(root: &Path) -> Result<Vec<ContentItem>> {
    let mut paths = Vec::new();
    collect_markdown(root, &mut paths)
        .with_context(|| format!("Failed to read content directory {}", root.display()))?;
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let relative = path.strip_prefix(root).unwrap_or(path);
            Ok(parse_source(relative, &text))
        })
        .collect()
}

fn collect_markdown(dir: &Path, paths: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_markdown(&path, paths)?;
        } else if path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    Ok(())
}

/// Build a content item from a source file at `relative` (to the content root).
pub fn parse_source(relative: &Path, text: &str) -> ContentItem {
    let (metadata, body) = split_header(text);

    let is_page = relative
        .components()
        .next()
        .is_some_and(|c| c.as_os_str() == PAGES_DIR);

    let slug = metadata
        .get_text("slug")
        .map(str::to_string)
        .unwrap_or_else(|| {
            relative
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

    let (kind, url) = if is_page {
        (ContentKind::Page, format!("{}/{}.html", PAGES_DIR, slug))
    } else {
        (ContentKind::Article, format!("{}.html", slug))
    };

    ContentItem {
        kind,
        url,
        content: body.trim().to_string(),
        metadata,
    }
}

/// Split header lines from the body. Keys are lower-cased.
fn split_header(text: &str) -> (Metadata, &str) {
    let mut metadata = Metadata::new();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            offset += line.len();
            break;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            break;
        };
        if key.is_empty() || key.contains(char::is_whitespace) {
            break;
        }
        metadata.insert(key.to_lowercase(), value.trim());
        offset += line.len();
    }

    (metadata, &text[offset..])
}
