//! One generation pass, driven by the host's lifecycle hooks.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::collection::{EventCollection, EventViews};
use crate::config::Settings;
use crate::content::ContentItem;
use crate::error::CalFeedResult;
use crate::extract::extract_event;
use crate::feed::emit_feed;
use crate::recurrence::expand_next_occurrence;

/// What a finished pass hands back to the host.
#[derive(Debug)]
pub struct PassOutput {
    pub views: EventViews,
    /// Where the feed was written, if one is configured
    pub feed_path: Option<PathBuf>,
}

/// Owns the event collection across the hooks of a generation pass.
///
/// The same pass object may be reused; every [`begin`](Self::begin)
/// starts from an empty collection.
pub struct GenerationPass {
    settings: Settings,
    tz: Tz,
    collection: EventCollection,
}

impl GenerationPass {
    pub fn new(settings: Settings) -> CalFeedResult<Self> {
        let tz = settings.events.tz()?;
        Ok(GenerationPass {
            settings,
            tz,
            collection: EventCollection::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn collection(&self) -> &EventCollection {
        &self.collection
    }

    /// The current time in the site zone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    /// Reset the collection and add the next occurrence of every
    /// configured recurring series.
    pub fn begin(&mut self, now: DateTime<Tz>) -> CalFeedResult<()> {
        self.collection.reset();

        for series in &self.settings.events.recurring_events {
            let record = expand_next_occurrence(series, now, self.tz)?;
            self.collection.push(record);
        }

        tracing::info!(
            recurring = self.collection.len(),
            timezone = %self.tz,
            "Started generation pass"
        );
        Ok(())
    }

    /// Extract an event from one content item. Returns whether the item
    /// produced a published event.
    pub fn on_content(&mut self, item: &ContentItem) -> CalFeedResult<bool> {
        let Some(record) = extract_event(item, self.tz)? else {
            return Ok(false);
        };
        let published = !record.is_draft();
        self.collection.push(record);
        Ok(published)
    }

    /// Partition (when i18n subsites are enabled), write the feed and build
    /// the template views.
    pub fn finish(&mut self, now: DateTime<Tz>) -> CalFeedResult<PassOutput> {
        if self.settings.i18n_subsites {
            self.collection.partition_by_language();
        }

        let feed_events = self.collection.feed_events(&self.settings.default_lang);
        let feed_path = emit_feed(&self.settings, feed_events, now)?;
        let views = self.collection.assemble_views(now);

        tracing::info!(
            events = views.all.len(),
            upcoming = views.upcoming.len(),
            "Finished generation pass"
        );

        Ok(PassOutput { views, feed_path })
    }
}
