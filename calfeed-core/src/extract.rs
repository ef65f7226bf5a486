//! Turning content items into event records.

use chrono_tz::Tz;

use crate::constants::{DRAFT, EVENT_DURATION, EVENT_END, EVENT_START, LANG, STATUS};
use crate::content::ContentItem;
use crate::duration::parse_duration;
use crate::error::{CalFeedError, CalFeedResult};
use crate::event::{EventOrigin, EventRecord, EventStatus};
use crate::temporal::parse_instant;

/// Build an event record from a content item.
///
/// Returns `Ok(None)` for items that are not articles or have no
/// `event-start`. Drafts are returned with [`EventStatus::Draft`] so their
/// times are still available; the collection refuses them.
pub fn extract_event(item: &ContentItem, tz: Tz) -> CalFeedResult<Option<EventRecord>> {
    if !item.is_article() {
        return Ok(None);
    }

    let metadata = &item.metadata;
    if !metadata.contains_key(EVENT_START) {
        return Ok(None);
    }

    let title = metadata.title();
    let start = parse_instant(metadata, EVENT_START, tz)?;

    let end = if metadata.contains_key(EVENT_END) {
        parse_instant(metadata, EVENT_END, tz)?
    } else if metadata.contains_key(EVENT_DURATION) {
        let duration = parse_duration(metadata)?;
        start
            .checked_add_signed(duration)
            .ok_or_else(|| CalFeedError::DurationParse {
                token: metadata
                    .get(EVENT_DURATION)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
                title: title.clone(),
            })?
    } else {
        tracing::warn!(
            title = %title,
            "Either '{}' or '{}' must be specified in the event named '{}'",
            EVENT_END,
            EVENT_DURATION,
            title
        );
        start
    };

    let status = match metadata.get_text(STATUS) {
        Some(DRAFT) => EventStatus::Draft,
        _ => EventStatus::Published,
    };

    Ok(Some(EventRecord {
        title,
        start,
        end,
        metadata: metadata.clone(),
        url: item.url.clone(),
        lang: metadata.get(LANG).map(|v| v.to_string()),
        content: item.content.clone(),
        status,
        origin: EventOrigin::Article,
    }))
}
