//! Recurring series: natural-language rules expanded into their next occurrence.
//!
//! Rules such as "every third thursday at 6pm" are translated into an RRULE
//! value and expanded with the rrule crate. Only the single next occurrence
//! after "now" is produced for each series.

use chrono::{DateTime, Days, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::config::RecurringSeries;
use crate::constants::{DATE, EVENT_LOCATION, SUMMARY, TITLE};
use crate::duration::parse_duration_str;
use crate::error::{CalFeedError, CalFeedResult};
use crate::event::{EventOrigin, EventRecord, EventStatus};
use crate::metadata::Metadata;
use crate::temporal::localize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    fn as_ics_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

/// A natural-language rule translated into RRULE form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalRule {
    /// RRULE value, e.g. `FREQ=WEEKLY;BYDAY=MO`
    pub rrule: String,
    /// Time of day occurrences start at; midnight when not given
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Default)]
struct Pattern {
    frequency: Option<Frequency>,
    interval: u32,
    by_day: Vec<String>,
    by_month_day: Option<u32>,
}

impl Pattern {
    fn to_rrule(&self) -> Result<String, String> {
        let frequency = self.frequency.ok_or("no frequency found")?;
        let mut parts = vec![format!("FREQ={}", frequency.as_ics_str())];
        if self.interval > 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }
        if !self.by_day.is_empty() {
            parts.push(format!("BYDAY={}", self.by_day.join(",")));
        }
        if let Some(day) = self.by_month_day {
            parts.push(format!("BYMONTHDAY={}", day));
        }
        Ok(parts.join(";"))
    }
}

/// Translate a rule like "every monday at 6pm" into RRULE form.
pub fn to_rrule(text: &str) -> Result<NaturalRule, String> {
    let lowered = text.to_lowercase().replace(',', " ");
    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();

    let time = take_time(&mut tokens)?;
    let pattern = parse_pattern(&tokens)?;

    Ok(NaturalRule {
        rrule: pattern.to_rrule()?,
        time,
    })
}

/// Remove a trailing time phrase ("at 6pm", "6:30 pm", "at noon") from `tokens`.
fn take_time(tokens: &mut Vec<&str>) -> Result<Option<NaiveTime>, String> {
    if let Some(pos) = tokens.iter().position(|t| *t == "at") {
        let phrase = tokens[pos + 1..].concat();
        let time = parse_time(&phrase).ok_or_else(|| format!("unrecognized time '{}'", phrase))?;
        tokens.truncate(pos);
        return Ok(Some(time));
    }

    // "6:30 pm" / "6 pm" without "at"
    if tokens.len() >= 2 && matches!(tokens[tokens.len() - 1], "am" | "pm") {
        let phrase = tokens[tokens.len() - 2..].concat();
        if let Some(time) = parse_time(&phrase) {
            tokens.truncate(tokens.len() - 2);
            return Ok(Some(time));
        }
    }

    let clock_like = tokens.last().is_some_and(|last| {
        last.starts_with(|c: char| c.is_ascii_digit())
            && (last.contains(':') || last.ends_with("am") || last.ends_with("pm"))
    });
    if clock_like {
        let last = tokens.pop().unwrap_or_default();
        let time = parse_time(last).ok_or_else(|| format!("unrecognized time '{}'", last))?;
        return Ok(Some(time));
    }

    Ok(None)
}

fn parse_time(phrase: &str) -> Option<NaiveTime> {
    let phrase = phrase.replace('.', "");
    match phrase.as_str() {
        "noon" => return NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => return NaiveTime::from_hms_opt(0, 0, 0),
        _ => {}
    }

    let (clock, meridiem) = if let Some(clock) = phrase.strip_suffix("am") {
        (clock, Some(false))
    } else if let Some(clock) = phrase.strip_suffix("pm") {
        (clock, Some(true))
    } else {
        (phrase.as_str(), None)
    };

    let (hour, minute) = match clock.split_once(':') {
        Some((h, m)) => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        None => (clock.parse::<u32>().ok()?, 0),
    };

    let hour = match meridiem {
        None => hour,
        Some(_) if !(1..=12).contains(&hour) => return None,
        Some(false) => hour % 12,
        Some(true) => hour % 12 + 12,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn parse_pattern(tokens: &[&str]) -> Result<Pattern, String> {
    let mut rest = tokens;
    let mut pattern = Pattern {
        interval: 1,
        ..Pattern::default()
    };

    if let Some(tail) = rest
        .strip_prefix(&["every"])
        .or_else(|| rest.strip_prefix(&["each"]))
    {
        rest = tail;
    }

    if let Some((first, tail)) = rest.split_first() {
        if *first == "other" {
            pattern.interval = 2;
            rest = tail;
        } else if let Ok(n) = first.parse::<u32>() {
            if n == 0 {
                return Err("interval must be at least 1".to_string());
            }
            pattern.interval = n;
            rest = tail;
        }
    }

    let Some((head, tail)) = rest.split_first() else {
        return Err("empty rule".to_string());
    };

    if let Some(n) = ordinal(head) {
        let (day_token, tail) = tail
            .split_first()
            .ok_or_else(|| format!("expected a weekday after '{}'", head))?;
        let day = weekday(day_token).ok_or_else(|| format!("unknown weekday '{}'", day_token))?;
        expect_filler(tail)?;
        pattern.frequency = Some(Frequency::Monthly);
        pattern.by_day = vec![format!("{}{}", n, day)];
        return Ok(pattern);
    }

    match *head {
        "day" | "days" | "daily" => {
            expect_filler(tail)?;
            pattern.frequency = Some(Frequency::Daily);
        }
        "weekday" | "weekdays" => {
            expect_filler(tail)?;
            pattern.frequency = Some(Frequency::Weekly);
            pattern.by_day = ["MO", "TU", "WE", "TH", "FR"].map(String::from).to_vec();
        }
        "weekend" | "weekends" => {
            expect_filler(tail)?;
            pattern.frequency = Some(Frequency::Weekly);
            pattern.by_day = ["SA", "SU"].map(String::from).to_vec();
        }
        "week" | "weeks" | "weekly" | "biweekly" | "fortnightly" => {
            if matches!(*head, "biweekly" | "fortnightly") {
                pattern.interval = 2;
            }
            pattern.frequency = Some(Frequency::Weekly);
            pattern.by_day = weekday_list(strip_on(tail))?;
        }
        "month" | "months" | "monthly" => {
            pattern.frequency = Some(Frequency::Monthly);
            let tail = strip_on(tail);
            match tail.split_first() {
                None => {}
                Some((first, rest)) if ordinal(first).is_some() && !rest.is_empty() => {
                    let day = weekday(&rest[0]).ok_or_else(|| format!("unknown weekday '{}'", rest[0]))?;
                    expect_filler(&rest[1..])?;
                    pattern.by_day = vec![format!("{}{}", ordinal(first).unwrap_or(1), day)];
                }
                Some((first, rest)) => {
                    expect_filler(rest)?;
                    pattern.by_month_day =
                        Some(month_day(first).ok_or_else(|| format!("unknown day of month '{}'", first))?);
                }
            }
        }
        "year" | "years" | "yearly" | "annually" => {
            expect_filler(tail)?;
            pattern.frequency = Some(Frequency::Yearly);
        }
        _ => {
            pattern.frequency = Some(Frequency::Weekly);
            pattern.by_day = weekday_list(rest)?;
            if pattern.by_day.is_empty() {
                return Err(format!("unrecognized recurrence '{}'", tokens.join(" ")));
            }
        }
    }

    Ok(pattern)
}

/// Drop a leading "on" / "on the".
fn strip_on<'a, 'b>(tokens: &'a [&'b str]) -> &'a [&'b str] {
    let tokens = tokens.strip_prefix(&["on"]).unwrap_or(tokens);
    tokens.strip_prefix(&["the"]).unwrap_or(tokens)
}

fn expect_filler(tokens: &[&str]) -> Result<(), String> {
    match tokens
        .iter()
        .find(|t| !matches!(**t, "of" | "the" | "month" | "every" | "each"))
    {
        Some(extra) => Err(format!("unexpected '{}'", extra)),
        None => Ok(()),
    }
}

fn weekday_list(tokens: &[&str]) -> Result<Vec<String>, String> {
    let mut days = Vec::new();
    for token in tokens.iter().filter(|t| !matches!(**t, "and" | "&")) {
        let day = weekday(token).ok_or_else(|| format!("unknown weekday '{}'", token))?;
        if !days.iter().any(|d: &String| d == day) {
            days.push(day.to_string());
        }
    }
    Ok(days)
}

fn weekday(token: &str) -> Option<&'static str> {
    let token = token.strip_suffix('s').filter(|t| t.len() > 2).unwrap_or(token);
    match token {
        "monday" | "mon" => Some("MO"),
        "tuesday" | "tue" | "tues" => Some("TU"),
        "wednesday" | "wed" => Some("WE"),
        "thursday" | "thu" | "thur" | "thurs" => Some("TH"),
        "friday" | "fri" => Some("FR"),
        "saturday" | "sat" => Some("SA"),
        "sunday" | "sun" => Some("SU"),
        _ => None,
    }
}

fn ordinal(token: &str) -> Option<i32> {
    match token {
        "first" | "1st" => Some(1),
        "second" | "2nd" => Some(2),
        "third" | "3rd" => Some(3),
        "fourth" | "4th" => Some(4),
        "fifth" | "5th" => Some(5),
        "last" => Some(-1),
        _ => None,
    }
}

fn month_day(token: &str) -> Option<u32> {
    let digits = token.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    digits.parse().ok().filter(|d| (1..=31).contains(d))
}

/// Days searched backwards from "now" for an anchor whose time exists.
const ANCHOR_LOOKBACK_DAYS: u64 = 7;

/// First occurrence of `rule` strictly after `now`, in `tz`.
pub fn next_occurrence(rule: &NaturalRule, now: DateTime<Tz>, tz: Tz) -> Result<DateTime<Tz>, String> {
    let time = rule.time.unwrap_or(NaiveTime::MIN);

    // Anchor the series before "now" so the anchor itself is never returned.
    // The anchor's time of day carries over to every occurrence, so skip
    // days on which that wall-clock time falls in a DST gap.
    let today = now.with_timezone(&tz).date_naive();
    let anchor = (1..=ANCHOR_LOOKBACK_DAYS)
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .find_map(|date| localize(date.and_time(time), tz))
        .ok_or("cannot anchor rule in time zone")?;

    let rrule_text = format!(
        "DTSTART;TZID={}:{}\nRRULE:{}",
        tz.name(),
        anchor.format("%Y%m%dT%H%M%S"),
        rule.rrule
    );
    tracing::trace!(rrule = %rrule_text, "expanding recurring rule");

    let rrule_set: RRuleSet = rrule_text.parse().map_err(|e: rrule::RRuleError| e.to_string())?;
    let rrule_tz: rrule::Tz = tz.into();
    let result = rrule_set.after(now.with_timezone(&rrule_tz)).all(1);

    result
        .dates
        .first()
        .map(|dt| dt.with_timezone(&tz))
        .ok_or_else(|| "no upcoming occurrence".to_string())
}

/// Build the event record for the next occurrence of `series` after `now`.
pub fn expand_next_occurrence(
    series: &RecurringSeries,
    now: DateTime<Tz>,
    tz: Tz,
) -> CalFeedResult<EventRecord> {
    let rule_error = |reason: String| CalFeedError::RecurrenceRule {
        title: series.title.clone(),
        rule: series.recurring_rule.clone(),
        reason,
    };

    let rule = to_rrule(&series.recurring_rule).map_err(rule_error)?;
    let start = next_occurrence(&rule, now, tz).map_err(rule_error)?;
    let duration: TimeDelta = parse_duration_str(&series.event_duration, &series.title)?;
    let end = start
        .checked_add_signed(duration)
        .ok_or_else(|| CalFeedError::DurationParse {
            token: series.event_duration.clone(),
            title: series.title.clone(),
        })?;

    tracing::debug!(
        title = %series.title,
        rrule = %rule.rrule,
        start = %start,
        "expanded recurring event"
    );

    let mut metadata = Metadata::new();
    metadata.insert(TITLE, series.title.as_str());
    metadata.insert(SUMMARY, series.summary.as_str());
    metadata.insert(DATE, start.fixed_offset());
    metadata.insert(EVENT_LOCATION, series.location.as_str());

    Ok(EventRecord {
        title: series.title.clone(),
        start,
        end,
        metadata,
        url: format!("pages/{}", series.page_url),
        lang: None,
        content: series.summary.clone(),
        status: EventStatus::Published,
        origin: EventOrigin::Recurring,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TZ: Tz = chrono_tz::US::Pacific;

    /// Wednesday, 2025-09-17 12:00 Pacific
    fn now() -> DateTime<Tz> {
        TZ.with_ymd_and_hms(2025, 9, 17, 12, 0, 0).unwrap()
    }

    fn next(rule: &str) -> DateTime<Tz> {
        next_occurrence(&to_rrule(rule).unwrap(), now(), TZ).unwrap()
    }

    fn series(rule: &str, duration: &str) -> RecurringSeries {
        RecurringSeries {
            recurring_rule: rule.to_string(),
            page_url: "meetup.html".to_string(),
            location: "Room 1".to_string(),
            title: "Kernel meetup".to_string(),
            summary: "Monthly kernel hacking".to_string(),
            event_duration: duration.to_string(),
        }
    }

    #[test]
    fn weekly_rules() {
        let rule = to_rrule("every monday at 6pm").unwrap();
        assert_eq!(rule.rrule, "FREQ=WEEKLY;BYDAY=MO");
        assert_eq!(rule.time, NaiveTime::from_hms_opt(18, 0, 0));

        assert_eq!(to_rrule("every other tuesday").unwrap().rrule, "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU");
        assert_eq!(to_rrule("Mondays and Thursdays").unwrap().rrule, "FREQ=WEEKLY;BYDAY=MO,TH");
        assert_eq!(to_rrule("weekly on fri").unwrap().rrule, "FREQ=WEEKLY;BYDAY=FR");
        assert_eq!(to_rrule("every 2 weeks").unwrap().rrule, "FREQ=WEEKLY;INTERVAL=2");
        assert_eq!(to_rrule("every weekday").unwrap().rrule, "FREQ=WEEKLY;BYDAY=MO,TU,WE,TH,FR");
    }

    #[test]
    fn daily_monthly_yearly_rules() {
        assert_eq!(to_rrule("every 3 days").unwrap().rrule, "FREQ=DAILY;INTERVAL=3");
        assert_eq!(to_rrule("daily").unwrap().rrule, "FREQ=DAILY");
        assert_eq!(to_rrule("monthly on the 15th").unwrap().rrule, "FREQ=MONTHLY;BYMONTHDAY=15");
        assert_eq!(to_rrule("yearly").unwrap().rrule, "FREQ=YEARLY");
    }

    #[test]
    fn ordinal_weekday_rules() {
        let rule = to_rrule("every 2nd tuesday of the month at 18:30").unwrap();
        assert_eq!(rule.rrule, "FREQ=MONTHLY;BYDAY=2TU");
        assert_eq!(rule.time, NaiveTime::from_hms_opt(18, 30, 0));

        assert_eq!(to_rrule("last friday of the month").unwrap().rrule, "FREQ=MONTHLY;BYDAY=-1FR");
        assert_eq!(to_rrule("monthly on the third thursday").unwrap().rrule, "FREQ=MONTHLY;BYDAY=3TH");
    }

    #[test]
    fn time_phrases() {
        let time = |rule: &str| to_rrule(rule).unwrap().time;
        assert_eq!(time("every friday at noon"), NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(time("every friday at 6:30 pm"), NaiveTime::from_hms_opt(18, 30, 0));
        assert_eq!(time("every friday 7am"), NaiveTime::from_hms_opt(7, 0, 0));
        assert_eq!(time("every friday at 12am"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(time("every friday"), None);
    }

    #[test]
    fn rejects_unrecognized_rules() {
        assert!(to_rrule("whenever I feel like it").is_err());
        assert!(to_rrule("every 0 days").is_err());
        assert!(to_rrule("every monday at 25pm").is_err());
        assert!(to_rrule("").is_err());
    }

    #[test]
    fn next_weekday_occurrence() {
        assert_eq!(next("every monday"), TZ.with_ymd_and_hms(2025, 9, 22, 0, 0, 0).unwrap());
        assert_eq!(next("every monday at 6pm"), TZ.with_ymd_and_hms(2025, 9, 22, 18, 0, 0).unwrap());
    }

    #[test]
    fn same_day_occurrence_only_if_later() {
        assert_eq!(next("every wednesday at 6pm"), TZ.with_ymd_and_hms(2025, 9, 17, 18, 0, 0).unwrap());
        assert_eq!(next("every wednesday at 9am"), TZ.with_ymd_and_hms(2025, 9, 24, 9, 0, 0).unwrap());
        assert_eq!(next("every day at 9am"), TZ.with_ymd_and_hms(2025, 9, 18, 9, 0, 0).unwrap());
    }

    #[test]
    fn monthly_occurrences() {
        assert_eq!(
            next("every third thursday at 6pm"),
            TZ.with_ymd_and_hms(2025, 9, 18, 18, 0, 0).unwrap()
        );
        assert_eq!(next("last friday of the month"), TZ.with_ymd_and_hms(2025, 9, 26, 0, 0, 0).unwrap());
    }

    #[test]
    fn keeps_wall_clock_across_dst_change() {
        let now = TZ.with_ymd_and_hms(2025, 10, 30, 12, 0, 0).unwrap();
        let rule = to_rrule("every monday at 6pm").unwrap();
        let occurrence = next_occurrence(&rule, now, TZ).unwrap();
        assert_eq!(occurrence.to_rfc3339(), "2025-11-03T18:00:00-08:00");
    }

    #[test]
    fn keeps_time_when_anchor_day_is_in_dst_gap() {
        // 02:30 does not exist on 2025-03-09 in US/Pacific
        let now = TZ.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

        let daily = next_occurrence(&to_rrule("every day at 2:30am").unwrap(), now, TZ).unwrap();
        assert_eq!(daily, TZ.with_ymd_and_hms(2025, 3, 11, 2, 30, 0).unwrap());

        let weekly = next_occurrence(&to_rrule("every sunday at 2:30am").unwrap(), now, TZ).unwrap();
        assert_eq!(weekly, TZ.with_ymd_and_hms(2025, 3, 16, 2, 30, 0).unwrap());
    }

    #[test]
    fn expands_series_into_record() {
        let record = expand_next_occurrence(&series("every monday at 6pm", "2h 30m"), now(), TZ).unwrap();

        assert_eq!(record.start, TZ.with_ymd_and_hms(2025, 9, 22, 18, 0, 0).unwrap());
        assert_eq!(record.end, TZ.with_ymd_and_hms(2025, 9, 22, 20, 30, 0).unwrap());
        assert_eq!(record.url, "pages/meetup.html");
        assert_eq!(record.origin, EventOrigin::Recurring);
        assert_eq!(record.metadata.get_text("event-location"), Some("Room 1"));
        assert_eq!(record.metadata.get_text("summary"), Some("Monthly kernel hacking"));
        assert!(record.metadata.contains_key("date"));
        assert!(record.start > now());
    }

    #[test]
    fn bad_rule_names_series() {
        let err = expand_next_occurrence(&series("sometimes", "1h"), now(), TZ).unwrap_err();
        match err {
            CalFeedError::RecurrenceRule { title, rule, .. } => {
                assert_eq!(title, "Kernel meetup");
                assert_eq!(rule, "sometimes");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_duration_propagates() {
        let err = expand_next_occurrence(&series("every monday", "2x"), now(), TZ).unwrap_err();
        assert!(matches!(err, CalFeedError::UnknownTimeMultiplier { .. }));
    }

    #[test]
    fn overflowing_end_is_an_error() {
        let err = expand_next_occurrence(&series("every monday", "1e6w"), now(), TZ).unwrap_err();
        assert!(matches!(err, CalFeedError::DurationParse { .. }));
    }
}
