//! Timestamp parsing for event metadata.
//!
//! Numeric dates (`2025-09-18 18:00`) are parsed strictly so that impossible
//! values such as hour 25 or September 31 are rejected. Anything else,
//! including numeric dates in other layouts (`2025-09-18 6pm`), is handed to
//! fuzzydate, which understands phrases like "next friday 6pm".

use chrono::format::ParseErrorKind;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{CalFeedError, CalFeedResult};
use crate::metadata::{Metadata, MetadataValue};

/// Layouts accepted for numeric dates, tried in order.
const NUMERIC_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse `field_name` from `metadata` into an instant in `tz`.
///
/// Datetime values keep their wall-clock fields and have `tz` attached, so a
/// value that already carries an offset is re-expressed in the site zone
/// rather than converted.
pub fn parse_instant(metadata: &Metadata, field_name: &str, tz: Tz) -> CalFeedResult<DateTime<Tz>> {
    let field_error = |reason: String| CalFeedError::FieldParse {
        field: field_name.to_string(),
        title: metadata.title(),
        reason,
    };

    let naive = match metadata.get(field_name) {
        None => return Err(field_error("field is missing".to_string())),
        Some(MetadataValue::Text(s)) => parse_naive(s).map_err(field_error)?,
        Some(MetadataValue::DateTime(dt)) => *dt,
        Some(MetadataValue::ZonedDateTime(dt)) => dt.naive_local(),
    };

    localize(naive, tz).ok_or_else(|| {
        field_error(format!(
            "{} does not exist in time zone {}",
            naive.format("%Y-%m-%d %H:%M:%S"),
            tz.name()
        ))
    })
}

/// Attach `tz` to a wall-clock time. Ambiguous times (DST fold) resolve to
/// the earlier instant; times inside a DST gap return `None`.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest()
}

/// Parse a free-form date/time string into a wall-clock time.
pub fn parse_naive(input: &str) -> Result<NaiveDateTime, String> {
    let input = input.trim();

    if looks_numeric(input) {
        parse_numeric(input)
    } else {
        parse_natural(input)
    }
}

/// `YYYY-` prefix
fn looks_numeric(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() >= 5 && bytes[..4].iter().all(u8::is_ascii_digit) && bytes[4] == b'-'
}

fn parse_numeric(input: &str) -> Result<NaiveDateTime, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.naive_local());
    }

    let mut errors = Vec::with_capacity(NUMERIC_FORMATS.len() + 1);
    for format in NUMERIC_FORMATS {
        match NaiveDateTime::parse_from_str(input, format) {
            Ok(dt) => return Ok(dt),
            Err(e) => errors.push(e),
        }
    }

    match NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        Ok(date) => return Ok(date.and_time(NaiveTime::MIN)),
        Err(e) => errors.push(e),
    }

    // A field value that cannot exist is final; layout mismatches such as
    // "6:00 PM" get another chance with the permissive parser.
    if let Some(e) = errors
        .iter()
        .find(|e| matches!(e.kind(), ParseErrorKind::OutOfRange | ParseErrorKind::Impossible))
    {
        return Err(format!("'{}' is not a valid date/time: {}", input, e));
    }

    parse_natural(input)
}

fn parse_natural(input: &str) -> Result<NaiveDateTime, String> {
    let expanded = expand_abbreviations(strip_zone_abbreviation(input));
    fuzzydate::parse(&expanded).map_err(|_| format!("could not parse date/time \"{}\"", input))
}

/// Drop a trailing zone abbreviation such as `PDT` or `UTC`. Event times
/// are always read in the site zone.
fn strip_zone_abbreviation(input: &str) -> &str {
    let Some((head, last)) = input.trim_end().rsplit_once(char::is_whitespace) else {
        return input;
    };
    let is_zone = (2..=5).contains(&last.len())
        && last.bytes().all(|b| b.is_ascii_uppercase())
        && (last.ends_with('T') || last == "UTC");
    if is_zone { head.trim_end() } else { input }
}

/// Expand day and month abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    const ABBREVIATIONS: [(&str, &str); 22] = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thur", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("jan", "january"),
        ("feb", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("nov", "november"),
        ("dec", "december"),
    ];

    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            let bare = word.trim_end_matches([',', '.']);
            ABBREVIATIONS
                .iter()
                .find(|(abbr, _)| *abbr == bare)
                .map(|(_, full)| *full)
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn metadata() -> Metadata {
        let tz_none = NaiveDate::from_ymd_opt(2025, 9, 5)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        let tz_utc = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 9, 5, 23, 0, 0)
            .unwrap();

        let mut metadata = Metadata::new();
        metadata.insert("title", "September 2025 Portland Linux Kernel Meetup");
        metadata.insert("event-start", "2025-09-18 18:00");
        metadata.insert("event-end", "2025-09-18 21:00");
        metadata.insert("date", "2025-09-05 23:00");
        metadata.insert("tz-none", tz_none);
        metadata.insert("tz-utc", tz_utc);
        metadata
    }

    #[test]
    fn parses_start_and_end_in_site_zone() {
        let tz = chrono_tz::US::Pacific;
        let start = parse_instant(&metadata(), "event-start", tz).unwrap();
        let end = parse_instant(&metadata(), "event-end", tz).unwrap();

        assert_eq!(start, tz.with_ymd_and_hms(2025, 9, 18, 18, 0, 0).unwrap());
        assert_eq!(end, tz.with_ymd_and_hms(2025, 9, 18, 21, 0, 0).unwrap());
        assert_eq!(start.to_rfc3339(), "2025-09-18T18:00:00-07:00");
    }

    #[test]
    fn native_datetime_gets_site_zone_attached() {
        let tz = chrono_tz::US::Pacific;
        let parsed = parse_instant(&metadata(), "tz-none", tz).unwrap();
        assert_eq!(parsed, tz.with_ymd_and_hms(2025, 9, 5, 23, 0, 0).unwrap());
    }

    #[test]
    fn zoned_datetime_keeps_wall_clock_and_overrides_zone() {
        let tz = chrono_tz::US::Pacific;
        let parsed = parse_instant(&metadata(), "tz-utc", tz).unwrap();
        assert_eq!(parsed.hour(), 23);
        assert_eq!(parsed, tz.with_ymd_and_hms(2025, 9, 5, 23, 0, 0).unwrap());
    }

    #[test]
    fn accepts_seconds_and_iso_separator() {
        let tz = chrono_tz::UTC;
        for input in ["2025-09-18 18:00:00", "2025-09-18T18:00", "2025-09-18T18:00:00"] {
            let metadata: Metadata = [("event-start", input)].into_iter().collect();
            let parsed = parse_instant(&metadata, "event-start", tz).unwrap();
            assert_eq!(parsed, tz.with_ymd_and_hms(2025, 9, 18, 18, 0, 0).unwrap(), "{input}");
        }
    }

    #[test]
    fn bare_date_is_midnight() {
        let tz = chrono_tz::Europe::Berlin;
        let metadata: Metadata = [("date", "2025-09-05")].into_iter().collect();
        let parsed = parse_instant(&metadata, "date", tz).unwrap();
        assert_eq!(parsed, tz.with_ymd_and_hms(2025, 9, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_impossible_dates() {
        let tz = chrono_tz::UTC;
        for input in ["2025-09-18 25:00", "2025-09-31 10:00", "2025-13-01 10:00"] {
            let metadata: Metadata = [("title", "Bad"), ("event-start", input)]
                .into_iter()
                .collect();
            let err = parse_instant(&metadata, "event-start", tz).unwrap_err();
            match err {
                CalFeedError::FieldParse { field, title, .. } => {
                    assert_eq!(field, "event-start");
                    assert_eq!(title, "Bad");
                }
                other => panic!("unexpected error for {input}: {other}"),
            }
        }
    }

    #[test]
    fn numeric_date_with_twelve_hour_clock() {
        for input in ["2025-09-18 6:00 PM", "2025-09-18 6pm", "2025-09-18 6:00pm"] {
            assert_eq!(
                parse_naive(input).unwrap(),
                NaiveDate::from_ymd_opt(2025, 9, 18).unwrap().and_hms_opt(18, 0, 0).unwrap(),
                "{input}"
            );
        }
    }

    #[test]
    fn trailing_zone_abbreviation_is_ignored() {
        let tz = chrono_tz::US::Pacific;
        let metadata: Metadata = [("event-start", "2025-09-18 18:00 PDT")].into_iter().collect();
        let parsed = parse_instant(&metadata, "event-start", tz).unwrap();
        assert_eq!(parsed, tz.with_ymd_and_hms(2025, 9, 18, 18, 0, 0).unwrap());

        assert_eq!(strip_zone_abbreviation("2025-09-18 6pm UTC"), "2025-09-18 6pm");
        assert_eq!(strip_zone_abbreviation("next friday"), "next friday");
    }

    #[test]
    fn impossible_values_skip_the_permissive_parser() {
        let err = parse_naive("2025-09-31 6pm").unwrap_err();
        assert!(err.contains("could not parse"), "{err}");

        let err = parse_naive("2025-02-30 18:00").unwrap_err();
        assert!(err.contains("is not a valid date/time"), "{err}");
    }

    #[test]
    fn rejects_gibberish() {
        let metadata: Metadata = [("title", "Bad"), ("event-start", "not a date at all xyz")]
            .into_iter()
            .collect();
        let err = parse_instant(&metadata, "event-start", chrono_tz::UTC).unwrap_err();
        assert!(err.to_string().contains("'event-start'"));
        assert!(err.to_string().contains("'Bad'"));
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let err = parse_instant(&Metadata::new(), "date", chrono_tz::UTC).unwrap_err();
        assert!(matches!(err, CalFeedError::FieldParse { .. }));
    }

    #[test]
    fn dst_gap_is_rejected() {
        let metadata: Metadata = [("event-start", "2025-03-09 02:30")].into_iter().collect();
        let err = parse_instant(&metadata, "event-start", chrono_tz::US::Pacific).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn dst_fold_takes_earlier_instant() {
        let metadata: Metadata = [("event-start", "2025-11-02 01:30")].into_iter().collect();
        let parsed = parse_instant(&metadata, "event-start", chrono_tz::US::Pacific).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-11-02T01:30:00-07:00");
    }

    #[test]
    fn wall_clock_round_trips_across_zones() {
        let zones = [
            chrono_tz::UTC,
            chrono_tz::US::Pacific,
            chrono_tz::Europe::Berlin,
            chrono_tz::Asia::Kolkata,
            chrono_tz::Australia::Sydney,
        ];
        for tz in zones {
            for hhmm in ["00:00", "06:15", "12:00", "18:45", "23:59"] {
                let input = format!("2025-06-10 {hhmm}");
                let metadata: Metadata = [("event-start", input.as_str())].into_iter().collect();
                let parsed = parse_instant(&metadata, "event-start", tz).unwrap();
                assert_eq!(parsed.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(), input);
            }
        }
    }

    #[test]
    fn natural_language_dates_parse() {
        assert!(parse_naive("tomorrow").is_ok());
    }

    #[test]
    fn expands_abbreviations() {
        assert_eq!(expand_abbreviations("sat 3pm"), "saturday 3pm");
        assert_eq!(expand_abbreviations("Sept 5"), "september 5");
        assert_eq!(expand_abbreviations("next friday"), "next friday");
    }
}
