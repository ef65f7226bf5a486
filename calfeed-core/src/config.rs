//! Site and event-plugin configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TIMEZONE, SUMMARY};
use crate::error::{CalFeedError, CalFeedResult};

/// Environment variables with this prefix override file settings,
/// e.g. `CALFEED_EVENTS__TIMEZONE=Europe/Berlin`.
const ENV_PREFIX: &str = "CALFEED";

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_summary_field() -> String {
    SUMMARY.to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output")
}

fn default_lang() -> String {
    "en".to_string()
}

/// Top-level site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL prepended to item URLs to build feed UIDs
    #[serde(default)]
    pub site_url: String,

    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default = "default_lang")]
    pub default_lang: String,

    /// Partition events by their `lang` metadata
    #[serde(default)]
    pub i18n_subsites: bool,

    #[serde(default)]
    pub events: EventsConfig,
}

/// Settings for the events plugin itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// IANA zone name all event times are interpreted in
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Feed file name relative to the output path; no feed when unset
    #[serde(default)]
    pub ics_fname: Option<String>,

    #[serde(default = "default_summary_field")]
    pub metadata_field_for_summary: String,

    #[serde(default)]
    pub recurring_events: Vec<RecurringSeries>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        EventsConfig {
            timezone: default_timezone(),
            ics_fname: None,
            metadata_field_for_summary: default_summary_field(),
            recurring_events: Vec::new(),
        }
    }
}

/// One configured recurring event series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringSeries {
    /// Natural-language rule, e.g. "every third thursday at 6pm"
    pub recurring_rule: String,
    pub page_url: String,
    pub location: String,
    pub title: String,
    pub summary: String,
    #[serde(rename = "event-duration")]
    pub event_duration: String,
}

impl EventsConfig {
    pub fn tz(&self) -> CalFeedResult<Tz> {
        self.timezone.parse::<Tz>().map_err(|e| {
            CalFeedError::Config(format!("unknown time zone '{}': {}", self.timezone, e))
        })
    }

    /// The configured feed file name, ignoring blank values.
    pub fn feed_file_name(&self) -> Option<&str> {
        self.ics_fname.as_deref().map(str::trim).filter(|name| !name.is_empty())
    }
}

impl Settings {
    /// Load settings from a TOML file, layered with `CALFEED_*` environment
    /// variables. A missing file yields the defaults.
    pub fn load(path: &Path) -> CalFeedResult<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CalFeedError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalFeedError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(content: &str) -> CalFeedResult<Self> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| CalFeedError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> CalFeedResult<()> {
        self.events.tz()?;
        Ok(())
    }

    /// Absolute location of the feed, if one is configured.
    pub fn feed_path(&self) -> Option<PathBuf> {
        self.events
            .feed_file_name()
            .map(|name| self.output_path.join(name))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            site_url: String::new(),
            output_path: default_output_path(),
            default_lang: default_lang(),
            i18n_subsites: false,
            events: EventsConfig::default(),
        }
    }
}
