//! Event records collected during a generation pass.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::metadata::Metadata;

/// A content item (or recurring series occurrence) with resolved times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub metadata: Metadata,
    /// Site-relative URL, also used to build the feed UID
    pub url: String,
    pub lang: Option<String>,
    /// Body text (HTML) used for the feed description
    pub content: String,
    pub status: EventStatus,
    pub origin: EventOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Published,
    /// Parsed but kept out of listings and the feed
    Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOrigin {
    Article,
    Recurring,
}

impl EventRecord {
    pub fn is_draft(&self) -> bool {
        self.status == EventStatus::Draft
    }

    /// Sort key shared by every listing: start, then end.
    pub fn sort_key(&self) -> (DateTime<Tz>, DateTime<Tz>) {
        (self.start, self.end)
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({} – {})",
            self.title,
            self.start.format("%Y-%m-%d %H:%M %Z"),
            self.end.format("%Y-%m-%d %H:%M %Z")
        )
    }
}
