//! Calendar feed generation and output.

mod event;
mod generate;
pub mod html;
mod vtimezone;
mod write;

pub use event::{FeedEvent, FeedProperty, PropertyValue};
pub use generate::{FeedOptions, generate_feed};
pub use html::strip_html_tags;
pub use vtimezone::vtimezone;
pub use write::{emit_feed, write_feed};
