//! Slot arithmetic -- converts local wall-clock open hours into candidate
//! slot starts, and local wall times into UTC instants.
//!
//! Pure functions, no I/O. All timezone handling goes through `chrono-tz`
//! so DST transitions are resolved against the real tz database.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Fixed duration of every bookable slot, in minutes.
pub const SLOT_DURATION_MINUTES: i64 = 45;

/// The fixed slot duration as a [`chrono::Duration`].
pub fn slot_duration() -> Duration {
    Duration::minutes(SLOT_DURATION_MINUTES)
}

/// Enumerate candidate slot starts within one local day's open interval.
///
/// Starts at `open` and steps by the slot duration. A slot is emitted only
/// if it ends at or before `close`: a slot ending exactly at `close` is
/// included, one ending after is excluded. An inverted interval
/// (`open >= close`) yields no slots.
///
/// Deterministic and side-effect free; restartable from any call.
pub fn slot_starts(day: NaiveDate, open: NaiveTime, close: NaiveTime) -> Vec<NaiveDateTime> {
    let close_dt = day.and_time(close);
    let step = slot_duration();

    let mut out = Vec::new();
    let mut cursor = day.and_time(open);
    while cursor + step <= close_dt {
        out.push(cursor);
        cursor = cursor + step;
    }
    out
}

/// Consecutive local dates starting at `start`, `days` entries long.
pub fn daterange(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days)
        .map(|offset| start + Duration::days(i64::from(offset)))
        .collect()
}

/// Resolve a local wall time in `tz` to a UTC instant.
///
/// Returns `None` when the wall time does not exist in `tz` (the
/// spring-forward gap): such a slot is non-materializable and callers must
/// drop it. An ambiguous wall time (the fall-back overlap) resolves to the
/// earlier of the two offsets, keeping the conversion deterministic.
pub fn to_utc(local: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _later) => Some(earlier.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// View a UTC instant as wall-clock time in `tz`.
pub fn to_local(utc: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    utc.with_timezone(&tz)
}

/// UTC bounds of one local civil day: the half-open interval
/// `[00:00 local, next day 00:00 local)` expressed as UTC instants.
///
/// Returns `None` if either midnight falls in a DST gap. (No real zone
/// currently skips midnight on the supported transition rules, but the
/// conversion is total over the tz database rather than assuming that.)
pub fn local_day_bounds(day: NaiveDate, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = to_utc(day.and_time(NaiveTime::MIN), tz)?;
    let end = to_utc((day + Duration::days(1)).and_time(NaiveTime::MIN), tz)?;
    Some((start, end))
}
