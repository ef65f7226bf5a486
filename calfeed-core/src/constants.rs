//! Metadata keys and fixed values shared across the crate.

/// Metadata prefix marking a field as event data.
pub const EVENT_PREFIX: &str = "event-";

pub const EVENT_START: &str = "event-start";
pub const EVENT_END: &str = "event-end";
pub const EVENT_DURATION: &str = "event-duration";
pub const EVENT_LOCATION: &str = "event-location";

pub const TITLE: &str = "title";
pub const SUMMARY: &str = "summary";
pub const STATUS: &str = "status";
pub const LANG: &str = "lang";
pub const DATE: &str = "date";

/// `status` value that keeps an item out of the published collection.
pub const DRAFT: &str = "draft";

pub const UNTITLED: &str = "(untitled)";

/// Duration unit suffixes, in the order they are listed to users.
pub const TIME_MULTIPLIERS: [(char, &str); 5] = [
    ('w', "weeks"),
    ('d', "days"),
    ('h', "hours"),
    ('m', "minutes"),
    ('s', "seconds"),
];

/// Prefix for experimental iCalendar properties, accepted without lookup.
pub const EXPERIMENTAL_PREFIX: &str = "X-";

/// Line inserted into COMMENT ahead of rejected-field notes.
pub const ERROR_BANNER: &str = "*** errors occurred in processing event ***";

/// PRIORITY assigned to every emitted VEVENT.
pub const EVENT_PRIORITY: u32 = 5;

pub const PRODID: &str = "-//calfeed//calfeed-core//EN";

pub const DEFAULT_TIMEZONE: &str = "UTC";
