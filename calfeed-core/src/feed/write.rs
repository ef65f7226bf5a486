//! Writing the feed to disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use chrono_tz::Tz;

use super::generate::{FeedOptions, generate_feed};
use crate::config::Settings;
use crate::error::CalFeedResult;
use crate::event::EventRecord;

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_feed(path: &Path, contents: &[u8]) -> CalFeedResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Generate and write the feed configured in `settings`.
///
/// Returns the written path, or `None` when no feed file is configured.
pub fn emit_feed(
    settings: &Settings,
    events: &[EventRecord],
    now: DateTime<Tz>,
) -> CalFeedResult<Option<PathBuf>> {
    let Some(path) = settings.feed_path() else {
        tracing::debug!("No ics_fname configured, skipping feed");
        return Ok(None);
    };

    let options = FeedOptions {
        site_url: settings.site_url.clone(),
        summary_field: settings.events.metadata_field_for_summary.clone(),
    };
    let ics = generate_feed(events, now, &options)?;
    write_feed(&path, ics.as_bytes())?;

    tracing::info!(path = %path.display(), "Wrote calendar feed");
    Ok(Some(path))
}
