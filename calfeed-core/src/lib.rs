//! Event extraction and ICS feed generation for static sites.
//!
//! Content items carrying `event-*` metadata are turned into
//! [`EventRecord`]s, collected per generation pass, and written out as
//! template listings and a calendar feed:
//! - `temporal` / `duration` parse start, end and duration fields
//! - `recurrence` expands configured natural-language series
//! - `policy` / `transfer` decide which metadata becomes feed properties
//! - `collection` / `feed` assemble the views and the feed
//! - `pass` ties them to the host's lifecycle

pub mod collection;
pub mod config;
pub mod constants;
pub mod content;
pub mod duration;
pub mod error;
pub mod event;
pub mod extract;
pub mod feed;
pub mod metadata;
pub mod pass;
pub mod policy;
pub mod recurrence;
pub mod temporal;
pub mod transfer;

pub use collection::{CollectionView, EventCollection, EventViews};
pub use config::{EventsConfig, RecurringSeries, Settings};
pub use content::{ContentItem, ContentKind};
pub use error::{CalFeedError, CalFeedResult};
pub use event::{EventOrigin, EventRecord, EventStatus};
pub use metadata::{Metadata, MetadataValue};
pub use pass::{GenerationPass, PassOutput};
