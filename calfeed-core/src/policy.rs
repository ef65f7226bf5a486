//! Which iCalendar properties content metadata may populate.
//!
//! Disallowed properties either leak scheduling or identity data a page
//! author should not control (ORGANIZER, ATTENDEE) or are generated by the
//! feed itself (DTSTART, DTEND, SEQUENCE). Property names come from the IANA
//! iCalendar registry: <https://www.iana.org/assignments/icalendar/icalendar.xhtml>

use std::fmt;

use crate::constants::{EVENT_PREFIX, EXPERIMENTAL_PREFIX};

/// Allow/deny decision for one registered property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDecision {
    pub name: &'static str,
    pub allowed: bool,
    pub citation: &'static str,
}

const fn allow(name: &'static str, citation: &'static str) -> PropertyDecision {
    PropertyDecision {
        name,
        allowed: true,
        citation,
    }
}

const fn deny(name: &'static str, citation: &'static str) -> PropertyDecision {
    PropertyDecision {
        name,
        allowed: false,
        citation,
    }
}

pub static PROPERTY_TABLE: &[PropertyDecision] = &[
    deny("CALSCALE", "[RFC5545, Section 3.7.1]"),
    deny("METHOD", "[RFC5545, Section 3.7.2]"),
    deny("PRODID", "[RFC5545, Section 3.7.3]"),
    deny("VERSION", "[RFC5545, Section 3.7.4]"),
    deny("ATTACH", "[RFC5545, Section 3.8.1.1]"),
    allow("CATEGORIES", "[RFC5545, Section 3.8.1.2] [RFC7986, Section 5.6]"),
    deny("CLASS", "[RFC5545, Section 3.8.1.3]"),
    allow("COMMENT", "[RFC5545, Section 3.8.1.4]"),
    allow("DESCRIPTION", "[RFC5545, Section 3.8.1.5] [RFC7986, Section 5.2]"),
    allow("GEO", "[RFC5545, Section 3.8.1.6]"),
    allow("LOCATION", "[RFC5545, Section 3.8.1.7]"),
    deny("PERCENT-COMPLETE", "[RFC5545, Section 3.8.1.8]"),
    deny("PRIORITY", "[RFC5545, Section 3.8.1.9]"),
    deny("RESOURCES", "[RFC5545, Section 3.8.1.10]"),
    allow("STATUS", "[RFC5545, Section 3.8.1.11]"),
    allow("SUMMARY", "[RFC5545, Section 3.8.1.12]"),
    deny("COMPLETED", "[RFC5545, Section 3.8.2.1]"),
    deny("DTEND", "[RFC5545, Section 3.8.2.2]"),
    deny("DUE", "[RFC5545, Section 3.8.2.3]"),
    deny("DTSTART", "[RFC5545, Section 3.8.2.4]"),
    deny("DURATION", "[RFC5545, Section 3.8.2.5]"),
    deny("FREEBUSY", "[RFC5545, Section 3.8.2.6]"),
    deny("TRANSP", "[RFC5545, Section 3.8.2.7]"),
    deny("TZID", "[RFC5545, Section 3.8.3.1]"),
    deny("TZNAME", "[RFC5545, Section 3.8.3.2]"),
    deny("TZOFFSETFROM", "[RFC5545, Section 3.8.3.3]"),
    deny("TZOFFSETTO", "[RFC5545, Section 3.8.3.4]"),
    deny("TZURL", "[RFC5545, Section 3.8.3.5]"),
    deny("ATTENDEE", "[RFC5545, Section 3.8.4.1]"),
    deny("CONTACT", "[RFC5545, Section 3.8.4.2]"),
    deny("ORGANIZER", "[RFC5545, Section 3.8.4.3]"),
    deny("RECURRENCE-ID", "[RFC5545, Section 3.8.4.4]"),
    deny("RELATED-TO", "[RFC5545, Section 3.8.4.5] [RFC9253, Section 9.1]"),
    allow("URL", "[RFC5545, Section 3.8.4.6] [RFC7986, Section 5.5]"),
    allow("UID", "[RFC5545, Section 3.8.4.7] [RFC7986, Section 5.3]"),
    deny("EXDATE", "[RFC5545, Section 3.8.5.1]"),
    deny("EXRULE", "Deprecated [RFC2445, Section 4.8.5.2]"),
    deny("RDATE", "[RFC5545, Section 3.8.5.2]"),
    deny("RRULE", "[RFC5545, Section 3.8.5.3]"),
    deny("ACTION", "[RFC5545, Section 3.8.6.1]"),
    deny("REPEAT", "[RFC5545, Section 3.8.6.2]"),
    deny("TRIGGER", "[RFC5545, Section 3.8.6.3]"),
    allow("CREATED", "[RFC5545, Section 3.8.7.1]"),
    deny("DTSTAMP", "[RFC5545, Section 3.8.7.2]"),
    deny("LAST-MODIFIED", "[RFC5545, Section 3.8.7.3] [RFC7986, Section 5.4]"),
    deny("SEQUENCE", "[RFC5545, Section 3.8.7.4]"),
    deny("REQUEST-STATUS", "[RFC5545, Section 3.8.8.3]"),
    deny("XML", "[RFC6321, Section 4.2]"),
    deny("TZUNTIL", "[RFC7808, Section 7.1]"),
    deny("TZID-ALIAS-OF", "[RFC7808, Section 7.2]"),
    deny("BUSYTYPE", "[RFC7953, Section 3.2]"),
    allow("NAME", "[RFC7986, Section 5.1]"),
    deny("REFRESH-INTERVAL", "[RFC7986, Section 5.7]"),
    deny("SOURCE", "[RFC7986, Section 5.8]"),
    deny("COLOR", "[RFC7986, Section 5.9]"),
    allow("IMAGE", "[RFC7986, Section 5.10]"),
    allow("CONFERENCE", "[RFC7986, Section 5.11]"),
    deny("CALENDAR-ADDRESS", "[RFC9073, Section 6.4]"),
    deny("LOCATION-TYPE", "[RFC9073, Section 6.1]"),
    deny("PARTICIPANT-TYPE", "[RFC9073, Section 6.2]"),
    deny("RESOURCE-TYPE", "[RFC9073, Section 6.3]"),
    deny("STRUCTURED-DATA", "[RFC9073, Section 6.6]"),
    allow("STYLED-DESCRIPTION", "[RFC9073, Section 6.5]"),
    deny("ACKNOWLEDGED", "[RFC9074, Section 6.1]"),
    deny("PROXIMITY", "[RFC9074, Section 8.1]"),
    allow("CONCEPT", "[RFC9253, Section 8.1]"),
    allow("LINK", "[RFC9253, Section 8.2]"),
    allow("REFID", "[RFC9253, Section 8.3]"),
];

/// Outcome of checking a candidate property name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyCheck {
    Accepted,
    Rejected(String),
}

impl PropertyCheck {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PropertyCheck::Accepted)
    }
}

impl fmt::Display for PropertyCheck {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PropertyCheck::Accepted => write!(f, "accepted"),
            PropertyCheck::Rejected(reason) => write!(f, "rejected: {}", reason),
        }
    }
}

/// Look up a property by name, ignoring case.
pub fn property_decision(name: &str) -> Option<&'static PropertyDecision> {
    PROPERTY_TABLE
        .iter()
        .find(|decision| decision.name.eq_ignore_ascii_case(name))
}

/// Decide whether `field_name` may become a calendar property.
///
/// Accepts both bare property names (`location`) and metadata keys
/// (`event-location`).
pub fn check_property(field_name: &str) -> PropertyCheck {
    let name = strip_prefix_ignore_case(field_name, EVENT_PREFIX).unwrap_or(field_name);
    check_name(name)
}

/// Decide whether the bare property `name` is allowed. No prefix is
/// stripped, so `event-location` is looked up as is.
pub(crate) fn check_name(name: &str) -> PropertyCheck {
    if strip_prefix_ignore_case(name, EXPERIMENTAL_PREFIX).is_some() {
        return PropertyCheck::Accepted;
    }

    match property_decision(name) {
        None => PropertyCheck::Rejected(format!("unrecognized iCalendar property '{}'", name)),
        Some(decision) if decision.allowed => PropertyCheck::Accepted,
        Some(decision) => PropertyCheck::Rejected(format!(
            "property '{}' disallowed, ref: {}",
            name, decision.citation
        )),
    }
}

/// `s` without `prefix`, compared ASCII case-insensitively.
pub(crate) fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}
