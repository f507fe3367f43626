//! iCalendar export: renders one committed booking as a single-VEVENT
//! RFC 5545 artifact suitable for calendar import.

use chrono::{DateTime, Utc};

use crate::model::{Booking, Resource};

/// UTC instant in iCalendar basic format, e.g. `20260406T090000Z`.
fn ical_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape a TEXT property value (RFC 5545 section 3.3.11): backslash,
/// semicolon, comma, and newline.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Render the calendar artifact for a committed booking.
///
/// The event runs from the booking's start for the fixed slot duration,
/// is marked busy (`TRANSP:OPAQUE`), and carries the booking id in its
/// `UID` so re-imports replace rather than duplicate. `host`, when given,
/// becomes a `URL` back to the booking page. `now` stamps `DTSTAMP`,
/// `CREATED`, and `LAST-MODIFIED`.
pub fn render(
    booking: &Booking,
    resource: &Resource,
    host: Option<&str>,
    now: DateTime<Utc>,
) -> String {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".into(),
        "VERSION:2.0".into(),
        "PRODID:-//slotbook//booking//EN".into(),
        "BEGIN:VEVENT".into(),
        format!("UID:{}@slotbook", booking.id),
        format!("DTSTAMP:{}", ical_utc(now)),
        format!("DTSTART:{}", ical_utc(booking.starts_at_utc)),
        format!("DTEND:{}", ical_utc(booking.ends_at_utc())),
        format!("SUMMARY:{}", escape_text(&format!("Appointment: {}", resource.name))),
        format!("DESCRIPTION:{}", escape_text(&format!("Resource: {}", resource.name))),
    ];
    if let Some(host) = host {
        lines.push(format!("URL:https://{host}/booking/"));
    }
    lines.extend([
        "CATEGORIES:Slotbook".into(),
        format!("CREATED:{}", ical_utc(now)),
        format!("LAST-MODIFIED:{}", ical_utc(now)),
        "TRANSP:OPAQUE".into(),
        "END:VEVENT".into(),
        "END:VCALENDAR".into(),
    ]);

    // RFC 5545 content lines are CRLF-delimited.
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}
