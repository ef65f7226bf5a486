//! Compact duration strings such as `2h 30m`.

use chrono::TimeDelta;

use crate::constants::EVENT_DURATION;
use crate::error::{CalFeedError, CalFeedResult};
use crate::metadata::Metadata;

/// Per-unit magnitudes of a duration string.
///
/// A unit given twice keeps its last magnitude: `1h 1h` is one hour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DurationSpec {
    pub weeks: f64,
    pub days: f64,
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl DurationSpec {
    /// Parse whitespace-separated `<number><unit>` tokens.
    pub fn parse(input: &str, title: &str) -> CalFeedResult<Self> {
        let mut spec = DurationSpec::default();

        for token in input.split_whitespace() {
            let Some(unit) = token.chars().last() else {
                continue;
            };
            let slot = spec.slot_mut(unit).ok_or_else(|| CalFeedError::UnknownTimeMultiplier {
                token: token.to_string(),
                title: title.to_string(),
            })?;

            let magnitude = &token[..token.len() - unit.len_utf8()];
            *slot = magnitude
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| CalFeedError::DurationParse {
                    token: token.to_string(),
                    title: title.to_string(),
                })?;
        }

        Ok(spec)
    }

    fn slot_mut(&mut self, unit: char) -> Option<&mut f64> {
        match unit {
            'w' => Some(&mut self.weeks),
            'd' => Some(&mut self.days),
            'h' => Some(&mut self.hours),
            'm' => Some(&mut self.minutes),
            's' => Some(&mut self.seconds),
            _ => None,
        }
    }

    /// Total elapsed time, to millisecond precision. `None` when the total
    /// does not fit in a `TimeDelta`.
    pub fn to_time_delta(&self) -> Option<TimeDelta> {
        let seconds = self.weeks * 604_800.0
            + self.days * 86_400.0
            + self.hours * 3_600.0
            + self.minutes * 60.0
            + self.seconds;
        let millis = (seconds * 1000.0).round();
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return None;
        }
        TimeDelta::try_milliseconds(millis as i64)
    }
}

/// Parse the `event-duration` field of `metadata`.
pub fn parse_duration(metadata: &Metadata) -> CalFeedResult<TimeDelta> {
    let title = metadata.title();
    let text = metadata
        .get(EVENT_DURATION)
        .map(|v| v.to_string())
        .unwrap_or_default();
    parse_duration_str(&text, &title)
}

/// Parse a duration string on behalf of the event named `title`.
pub fn parse_duration_str(input: &str, title: &str) -> CalFeedResult<TimeDelta> {
    let spec = DurationSpec::parse(input, title)?;
    let delta = spec.to_time_delta().ok_or_else(|| CalFeedError::DurationParse {
        token: input.trim().to_string(),
        title: title.to_string(),
    })?;
    tracing::trace!(input, seconds = delta.num_seconds(), "parsed duration");
    Ok(delta)
}

/// Human-readable rendering, e.g. `2h 30m`.
pub fn format_duration(delta: TimeDelta) -> String {
    match delta.to_std() {
        Ok(std) => humantime::format_duration(std).to_string(),
        Err(_) => format!("-{}", humantime::format_duration(delta.abs().to_std().unwrap_or_default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seconds(input: &str) -> i64 {
        parse_duration_str(input, "test").unwrap().num_seconds()
    }

    #[test]
    fn sums_units() {
        assert_eq!(seconds("2h 30m"), 9000);
        assert_eq!(seconds("1w 1d 1h 1m 1s"), 604_800 + 86_400 + 3_600 + 60 + 1);
        assert_eq!(seconds("3h"), 10_800);
    }

    #[test]
    fn repeated_unit_overwrites() {
        assert_eq!(seconds("1h 1h"), 3600);
        assert_eq!(seconds("1h 2h"), 7200);
        assert_eq!(seconds("5m 1h 10m"), 3600 + 600);
    }

    #[test]
    fn fractional_magnitudes() {
        assert_eq!(seconds("1.5h"), 5400);
        assert_eq!(seconds("0.5d"), 43_200);
    }

    #[test]
    fn extra_whitespace_is_ignored() {
        assert_eq!(seconds("  1h\t 30m  "), 5400);
        assert_eq!(seconds(""), 0);
    }

    #[test]
    fn unknown_suffix() {
        let err = parse_duration_str("1b", "Meetup").unwrap_err();
        match err {
            CalFeedError::UnknownTimeMultiplier { token, title } => {
                assert_eq!(token, "1b");
                assert_eq!(title, "Meetup");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_magnitude() {
        for input in ["hah", "m", "xh", "1h 2xm"] {
            let err = parse_duration_str(input, "Meetup").unwrap_err();
            assert!(
                matches!(err, CalFeedError::DurationParse { .. }),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn out_of_range_totals_are_errors() {
        for input in ["1e12w", "-1e30s", "1e300w 1e300d"] {
            let err = parse_duration_str(input, "Meetup").unwrap_err();
            assert!(
                matches!(err, CalFeedError::DurationParse { ref title, .. } if title == "Meetup"),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn large_but_representable_total() {
        assert_eq!(seconds("520w"), 520 * 604_800);
    }

    #[test]
    fn reads_event_duration_field() {
        let metadata: Metadata = [("title", "t"), ("event-duration", "45m")]
            .into_iter()
            .collect();
        assert_eq!(parse_duration(&metadata).unwrap(), TimeDelta::minutes(45));
    }

    #[test]
    fn formats_for_humans() {
        assert_eq!(format_duration(TimeDelta::seconds(9000)), "2h 30m");
        assert_eq!(format_duration(TimeDelta::zero()), "0s");
    }
}
