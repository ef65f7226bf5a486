//! VTIMEZONE blocks built from the chrono-tz database.

use chrono::{DateTime, Days, NaiveDate, Offset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};

/// One UTC offset change.
#[derive(Debug, Clone, PartialEq)]
struct Transition {
    /// First instant at which `offset_to` applies
    onset: DateTime<Utc>,
    offset_from: i32,
    offset_to: i32,
    daylight: bool,
    name: String,
}

/// The zone's state at an instant: total offset and whether DST is active.
fn observance(tz: Tz, instant: DateTime<Utc>) -> (i32, bool) {
    let offset = tz.offset_from_utc_datetime(&instant.naive_utc());
    let total = offset.fix().local_minus_utc();
    let daylight = !offset.dst_offset().is_zero();
    (total, daylight)
}

fn abbreviation(tz: Tz, instant: DateTime<Utc>) -> String {
    instant.with_timezone(&tz).format("%Z").to_string()
}

fn year_start(year: i32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Every offset change between the start of `first_year` and the end of
/// `last_year`, found by a daily scan refined to the second.
fn transitions(tz: Tz, first_year: i32, last_year: i32) -> Vec<Transition> {
    let (Some(begin), Some(end)) = (year_start(first_year), year_start(last_year + 1)) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    let mut previous = begin;
    let mut previous_state = observance(tz, begin);

    while previous < end {
        let Some(next) = previous.checked_add_days(Days::new(1)) else {
            break;
        };
        let state = observance(tz, next);

        if state != previous_state {
            // Narrow (lo, hi] down to the first second with the new state.
            let (mut lo, mut hi) = (previous.timestamp(), next.timestamp());
            while hi - lo > 1 {
                let mid = lo + (hi - lo) / 2;
                let Some(instant) = DateTime::from_timestamp(mid, 0) else {
                    break;
                };
                if observance(tz, instant) == previous_state {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            let onset = DateTime::from_timestamp(hi, 0).unwrap_or(next);
            found.push(Transition {
                onset,
                offset_from: previous_state.0,
                offset_to: state.0,
                daylight: state.1,
                name: abbreviation(tz, onset),
            });
            previous_state = state;
        }

        previous = next;
    }

    found
}

/// Render an offset in seconds as `+HHMM` (or `+HHMMSS`).
fn format_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    let (hours, minutes, secs) = (abs / 3600, (abs % 3600) / 60, abs % 60);
    if secs == 0 {
        format!("{}{:02}{:02}", sign, hours, minutes)
    } else {
        format!("{}{:02}{:02}{:02}", sign, hours, minutes, secs)
    }
}

/// Build a VTIMEZONE component for `tz` covering `first_year..=last_year`.
///
/// Lines are CRLF-terminated, ready to splice into a VCALENDAR.
pub fn vtimezone(tz: Tz, first_year: i32, last_year: i32) -> String {
    let mut lines = vec!["BEGIN:VTIMEZONE".to_string(), format!("TZID:{}", tz.name())];

    let changes = transitions(tz, first_year, last_year);
    if changes.is_empty() {
        let instant = year_start(first_year).unwrap_or_else(Utc::now);
        let (offset, _) = observance(tz, instant);
        let offset = format_offset(offset);
        lines.extend([
            "BEGIN:STANDARD".to_string(),
            "DTSTART:19700101T000000".to_string(),
            format!("TZOFFSETFROM:{}", offset),
            format!("TZOFFSETTO:{}", offset),
            format!("TZNAME:{}", abbreviation(tz, instant)),
            "END:STANDARD".to_string(),
        ]);
    }

    for change in &changes {
        let kind = if change.daylight { "DAYLIGHT" } else { "STANDARD" };
        // DTSTART is the wall-clock time just before the change.
        let local_onset = change.onset.naive_utc()
            + chrono::TimeDelta::seconds(i64::from(change.offset_from));
        lines.extend([
            format!("BEGIN:{}", kind),
            format!("DTSTART:{}", local_onset.format("%Y%m%dT%H%M%S")),
            format!("TZOFFSETFROM:{}", format_offset(change.offset_from)),
            format!("TZOFFSETTO:{}", format_offset(change.offset_to)),
            format!("TZNAME:{}", change.name),
            format!("END:{}", kind),
        ]);
    }

    lines.push("END:VTIMEZONE".to_string());

    let mut block = lines.join("\r\n");
    block.push_str("\r\n");
    block
}
