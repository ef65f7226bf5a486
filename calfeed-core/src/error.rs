//! Error types for calfeed.

use thiserror::Error;

use crate::constants::TIME_MULTIPLIERS;

/// Errors that can occur while turning content into calendar events.
#[derive(Error, Debug)]
pub enum CalFeedError {
    #[error("Unable to parse the '{field}' field in the event named '{title}': {reason}")]
    FieldParse {
        field: String,
        title: String,
        reason: String,
    },

    #[error(
        "Unknown time multiplier '{token}' value in the 'event-duration' field in the '{title}' event. Supported multipliers are: {}",
        supported_multipliers()
    )]
    UnknownTimeMultiplier { token: String, title: String },

    #[error("Unable to parse '{token}' value in the 'event-duration' field in the '{title}' event.")]
    DurationParse { token: String, title: String },

    #[error("Unable to expand recurring rule '{rule}' for the event named '{title}': {reason}")]
    RecurrenceRule {
        title: String,
        rule: String,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn supported_multipliers() -> String {
    TIME_MULTIPLIERS
        .iter()
        .map(|(suffix, _)| suffix.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result type alias for calfeed operations.
pub type CalFeedResult<T> = Result<T, CalFeedError>;
