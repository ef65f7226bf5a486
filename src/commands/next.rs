use anyhow::{Context, Result};
use calfeed_core::duration::{format_duration, parse_duration_str};
use calfeed_core::recurrence::{next_occurrence, to_rrule};
use chrono::Utc;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

pub fn run(rule: &str, duration: Option<&str>, timezone: Option<&str>) -> Result<()> {
    let tz = resolve_timezone(timezone)?;
    let now = Utc::now().with_timezone(&tz);

    let natural = to_rrule(rule).map_err(|e| anyhow::anyhow!("Could not parse rule \"{}\": {}", rule, e))?;
    let start = next_occurrence(&natural, now, tz).map_err(|e| anyhow::anyhow!(e))?;

    println!("{}", format!("RRULE:{}", natural.rrule).dimmed());
    println!("  Start: {}", start.format("%a %Y-%m-%d %H:%M %Z").bold());

    if let Some(duration) = duration {
        let delta = parse_duration_str(duration, rule)?;
        let end = start
            .checked_add_signed(delta)
            .with_context(|| format!("Duration \"{}\" is too large", duration))?;
        println!("  End:   {} ({})", end.format("%a %Y-%m-%d %H:%M %Z"), format_duration(delta));
    }

    Ok(())
}

/// The named zone, else the system zone, else UTC.
fn resolve_timezone(name: Option<&str>) -> Result<Tz> {
    match name {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Unknown time zone \"{}\"", name)),
        None => Ok(iana_time_zone::get_timezone()
            .ok()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(chrono_tz::UTC)),
    }
}
