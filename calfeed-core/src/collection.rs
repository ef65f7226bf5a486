//! The per-pass event collection and the views built from it.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{CalFeedError, CalFeedResult};
use crate::event::EventRecord;

/// An ordered listing, flat or split by language.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CollectionView {
    Flat(Vec<EventRecord>),
    ByLanguage(BTreeMap<String, Vec<EventRecord>>),
}

impl CollectionView {
    /// Total number of events across all partitions.
    pub fn len(&self) -> usize {
        match self {
            CollectionView::Flat(events) => events.len(),
            CollectionView::ByLanguage(buckets) => buckets.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The two listings handed to templates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventViews {
    /// Every event, newest first (`events_list`)
    #[serde(rename = "events_list")]
    pub all: CollectionView,
    /// Events ending today or later, soonest first (`upcoming_events_list`)
    #[serde(rename = "upcoming_events_list")]
    pub upcoming: CollectionView,
}

impl EventViews {
    /// The template context as pretty-printed JSON.
    pub fn to_json(&self) -> CalFeedResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CalFeedError::Serialization(e.to_string()))
    }
}

/// Events gathered during one generation pass.
#[derive(Debug, Default)]
pub struct EventCollection {
    events: Vec<EventRecord>,
    by_language: Option<BTreeMap<String, Vec<EventRecord>>>,
}

impl EventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything collected so far, including language buckets.
    pub fn reset(&mut self) {
        self.events.clear();
        self.by_language = None;
    }

    /// Add a record in arrival order. Drafts are refused.
    pub fn push(&mut self, record: EventRecord) {
        if record.is_draft() {
            tracing::debug!(event = %record, "Skipping draft event");
            return;
        }
        self.events.push(record);
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Rebuild the per-language buckets from the current events. When no
    /// event has a language the collection stays flat.
    pub fn partition_by_language(&mut self) {
        let mut buckets: BTreeMap<String, Vec<EventRecord>> = BTreeMap::new();
        for record in &self.events {
            match &record.lang {
                Some(lang) => buckets.entry(lang.clone()).or_default().push(record.clone()),
                None => {
                    tracing::debug!(title = %record.title, "Event has no language, omitted from partitions");
                }
            }
        }
        if buckets.is_empty() {
            tracing::debug!("No localized events, keeping flat views");
            self.by_language = None;
        } else {
            self.by_language = Some(buckets);
        }
    }

    pub fn is_partitioned(&self) -> bool {
        self.by_language.is_some()
    }

    /// Build the "all" (descending) and "upcoming" (ascending, ending
    /// today or later) views.
    pub fn assemble_views(&self, now: DateTime<Tz>) -> EventViews {
        match &self.by_language {
            None => EventViews {
                all: CollectionView::Flat(sorted_descending(&self.events)),
                upcoming: CollectionView::Flat(upcoming(&self.events, now)),
            },
            Some(buckets) => EventViews {
                all: CollectionView::ByLanguage(
                    buckets
                        .iter()
                        .map(|(lang, events)| (lang.clone(), sorted_descending(events)))
                        .collect(),
                ),
                upcoming: CollectionView::ByLanguage(
                    buckets
                        .iter()
                        .map(|(lang, events)| (lang.clone(), upcoming(events, now)))
                        .collect(),
                ),
            },
        }
    }

    /// Events that go into the feed: everything when unpartitioned,
    /// otherwise the default language's bucket.
    pub fn feed_events(&self, default_lang: &str) -> &[EventRecord] {
        match &self.by_language {
            None => &self.events,
            Some(buckets) => buckets.get(default_lang).map(Vec::as_slice).unwrap_or(&[]),
        }
    }
}

fn sorted_descending(events: &[EventRecord]) -> Vec<EventRecord> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    sorted
}

fn upcoming(events: &[EventRecord], now: DateTime<Tz>) -> Vec<EventRecord> {
    let today = now.date_naive();
    let mut selected: Vec<EventRecord> = events
        .iter()
        .filter(|e| e.end.with_timezone(&now.timezone()).date_naive() >= today)
        .cloned()
        .collect();
    selected.sort_by_key(EventRecord::sort_key);
    selected
}
