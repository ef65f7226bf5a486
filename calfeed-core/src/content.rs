//! Content items handed over by the site generator.

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

/// The generator's classification of a content item. Only articles can
/// become events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentKind {
    Article,
    Page,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    /// Site-relative URL, e.g. `2025/09/meetup.html`
    pub url: String,
    /// Rendered body (HTML)
    pub content: String,
    pub metadata: Metadata,
}

impl ContentItem {
    pub fn article(url: impl Into<String>, content: impl Into<String>, metadata: Metadata) -> Self {
        ContentItem {
            kind: ContentKind::Article,
            url: url.into(),
            content: content.into(),
            metadata,
        }
    }

    pub fn is_article(&self) -> bool {
        self.kind == ContentKind::Article
    }
}
