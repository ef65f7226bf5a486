//! ICS feed generation.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, Property};

use super::event::{FeedEvent, PropertyValue};
use super::html::strip_html_tags;
use super::vtimezone::vtimezone;
use crate::constants::{DATE, EVENT_PRIORITY, PRODID, SUMMARY};
use crate::error::{CalFeedError, CalFeedResult};
use crate::event::EventRecord;
use crate::temporal::parse_instant;
use crate::transfer::transfer_metadata;

/// Site-level inputs to feed generation.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Prefix for every UID
    pub site_url: String,
    /// Metadata field used for SUMMARY
    pub summary_field: String,
}

impl Default for FeedOptions {
    fn default() -> Self {
        FeedOptions {
            site_url: String::new(),
            summary_field: SUMMARY.to_string(),
        }
    }
}

/// Generate the calendar feed for every published event starting at or
/// after `now`. Times are written in `now`'s zone.
pub fn generate_feed(
    events: &[EventRecord],
    now: DateTime<Tz>,
    options: &FeedOptions,
) -> CalFeedResult<String> {
    let tz = now.timezone();
    let mut cal = Calendar::new();
    let mut last_year = now.year();
    let mut count = 0;

    for record in events.iter().filter(|e| !e.is_draft() && e.start >= now) {
        last_year = last_year.max(record.end.year());
        cal.push(build_event(record, now, tz, options));
        count += 1;
    }

    let cal = cal.done();
    tracing::debug!(events = count, "Generated calendar feed");

    let zone = vtimezone(tz, now.year(), last_year);
    finish_calendar(&cal.to_string(), &zone)
}

fn build_event(
    record: &EventRecord,
    now: DateTime<Tz>,
    tz: Tz,
    options: &FeedOptions,
) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();

    ics_event.uid(&format!("{}{}", options.site_url, record.url));
    ics_event.summary(&summary_for(record, &options.summary_field));
    ics_event.description(&strip_html_tags(&record.content));

    let dtstamp = stamp_for(record, now, tz)
        .format("%Y%m%dT%H%M%SZ")
        .to_string();
    ics_event.add_property("DTSTAMP", &dtstamp);

    add_zoned_property(&mut ics_event, "DTSTART", &record.start);
    add_zoned_property(&mut ics_event, "DTEND", &record.end);
    ics_event.add_property("PRIORITY", EVENT_PRIORITY.to_string());

    let mut passthrough = FeedEvent::new();
    transfer_metadata(&record.metadata, &mut passthrough);
    add_passthrough(&mut ics_event, &passthrough);

    ics_event.done()
}

/// SUMMARY text: the configured field, else the title.
fn summary_for(record: &EventRecord, field: &str) -> String {
    match record.metadata.get(field) {
        Some(value) => strip_html_tags(&value.to_string()),
        None => record.title.clone(),
    }
}

fn stamp_for(record: &EventRecord, now: DateTime<Tz>, tz: Tz) -> DateTime<Utc> {
    if !record.metadata.contains_key(DATE) {
        return now.with_timezone(&Utc);
    }
    match parse_instant(&record.metadata, DATE, tz) {
        Ok(stamp) => stamp.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!(title = %record.title, error = %e, "Using current time as DTSTAMP");
            now.with_timezone(&Utc)
        }
    }
}

/// Local time with a TZID parameter.
fn add_zoned_property(ics_event: &mut icalendar::Event, name: &str, time: &DateTime<Tz>) {
    let mut prop = Property::new(name, time.format("%Y%m%dT%H%M%S").to_string());
    prop.add_parameter("TZID", time.timezone().name());
    ics_event.append_property(prop);
}

fn add_passthrough(ics_event: &mut icalendar::Event, feed_event: &FeedEvent) {
    for property in &feed_event.properties {
        let name = property.name.to_ascii_uppercase();
        match &property.value {
            PropertyValue::Text(text) => {
                ics_event.add_property(&name, text);
            }
            PropertyValue::List(items) => {
                for item in items {
                    ics_event.append_multi_property(Property::new(&name, item));
                }
            }
            PropertyValue::Geo {
                latitude,
                longitude,
            } => {
                ics_event.add_property(&name, format!("{};{}", latitude, longitude));
            }
        }
    }

    if let Some(ref comment) = feed_event.comment {
        ics_event.add_property("COMMENT", comment);
    }
}

/// Post-process the icalendar crate's output.
/// - Replace PRODID with ours
/// - Remove CALSCALE:GREGORIAN (it's the default)
/// - Splice the VTIMEZONE block in ahead of the first VEVENT
fn finish_calendar(ics: &str, zone: &str) -> CalFeedResult<String> {
    let mut result = String::with_capacity(ics.len() + zone.len());
    let mut zone_written = false;

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        if !zone_written && (line == "BEGIN:VEVENT" || line == "END:VCALENDAR") {
            result.push_str(zone);
            zone_written = true;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    if !zone_written {
        return Err(CalFeedError::IcsGenerate(
            "calendar output has no END:VCALENDAR line".to_string(),
        ));
    }

    Ok(result)
}
