//! Copying `event-*` metadata onto a feed entry.

use crate::constants::{ERROR_BANNER, EVENT_PREFIX};
use crate::feed::{FeedEvent, PropertyValue};
use crate::metadata::Metadata;
use crate::policy::{PropertyCheck, check_name, strip_prefix_ignore_case};

/// Fields consumed by extraction rather than copied.
const TIME_FIELDS: [&str; 3] = ["start", "end", "duration"];

/// Copy every allowed `event-<name>` field from `metadata` onto `target`.
///
/// Rejected fields are not errors: their reasons are appended to the
/// entry's COMMENT below a banner so site authors can see them in any
/// calendar client.
pub fn transfer_metadata(metadata: &Metadata, target: &mut FeedEvent) {
    let mut comment: Vec<String> = Vec::new();
    let mut notes: Vec<String> = Vec::new();

    for (key, value) in metadata.iter() {
        let Some(name) = strip_prefix_ignore_case(key, EVENT_PREFIX) else {
            continue;
        };
        let name = name.to_ascii_lowercase();

        if TIME_FIELDS.contains(&name.as_str()) {
            continue;
        }

        let text = value.to_string();

        if name == "comment" {
            comment.push(text);
            continue;
        }

        if let PropertyCheck::Rejected(reason) = check_name(&name) {
            tracing::debug!(field = %key, %reason, "Skipping event field");
            notes.push(reason);
            continue;
        }

        let value = match name.as_str() {
            "geo" => match parse_geo(&text) {
                Some(geo) => geo,
                None => {
                    notes.push(format!("invalid GEO value '{}'", text));
                    continue;
                }
            },
            "categories" | "resources" => PropertyValue::List(split_list(&text)),
            _ => PropertyValue::Text(text),
        };

        tracing::debug!(field = %key, property = %name, "Transferring event field");
        target.set(name, value);
    }

    if !notes.is_empty() {
        comment.push(ERROR_BANNER.to_string());
        comment.extend(notes);
    }

    if !comment.is_empty() {
        target.comment = Some(comment.join("\n"));
    }
}

/// Parse `lat;lon` into a GEO value.
fn parse_geo(text: &str) -> Option<PropertyValue> {
    let (lat, lon) = text.split_once(';')?;
    let latitude: f64 = lat.trim().parse().ok()?;
    let longitude: f64 = lon.trim().parse().ok()?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }

    Some(PropertyValue::Geo {
        latitude,
        longitude,
    })
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
