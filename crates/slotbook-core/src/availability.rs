//! Availability resolver: merges recurring rules, date exceptions, and
//! existing bookings into the list of open slots for a resource.
//!
//! Read-only; takes no locks. The result is a point-in-time view and is
//! not consistent with concurrent writers -- a slot returned here may be
//! taken before the caller acts on it, in which case the coordinator
//! rejects the attempt with the conflict error.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{AvailabilityException, AvailabilityRule, Slot, Weekday};
use crate::slots::{daterange, slot_starts, to_local, to_utc};
use crate::store::{BookingStore, ExceptionStore, RuleStore};

/// Compute the open slots for `resource_id` over
/// `[window_start, window_start + window_days)` local dates.
///
/// Per date: a closed exception skips the date entirely; a not-closed
/// exception carrying both override times replaces every rule's hours for
/// that date; otherwise each weekday rule's own hours apply. Slot starts
/// must be strictly after `now`. Wall times that do not exist in `tz`
/// (spring-forward gap) are non-materializable and dropped.
///
/// Overlapping rules may produce duplicate slots; they are deliberately
/// not de-duplicated. Already-booked instants are filtered at the end, so
/// every copy of a taken instant disappears together.
///
/// Order: date-ascending, then rule order, then time-ascending. No
/// further ordering is guaranteed across overlapping rules.
pub fn list_available_slots<S>(
    store: &S,
    resource_id: Uuid,
    window_start: NaiveDate,
    window_days: u32,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<Vec<Slot>>
where
    S: RuleStore + ExceptionStore + BookingStore,
{
    let mut rules_by_weekday: HashMap<Weekday, Vec<AvailabilityRule>> = HashMap::new();
    for rule in store.active_rules(resource_id)? {
        rules_by_weekday.entry(rule.weekday).or_default().push(rule);
    }

    let exceptions: HashMap<NaiveDate, AvailabilityException> = store
        .exceptions(resource_id)?
        .into_iter()
        .map(|e| (e.date_local, e))
        .collect();

    let mut candidates: Vec<Slot> = Vec::new();
    for day in daterange(window_start, window_days) {
        let exception = exceptions.get(&day);
        if exception.is_some_and(|e| e.is_closed) {
            continue;
        }

        let Some(day_rules) = rules_by_weekday.get(&Weekday::of(day)) else {
            // No rules on this weekday; an exception alone opens nothing.
            continue;
        };

        for rule in day_rules {
            let mut open = rule.start_time_local;
            let mut close = rule.end_time_local;
            if let Some(e) = exception {
                // Override applies to every rule on the day, but only
                // when both times are present.
                if let (Some(s), Some(c)) = (e.start_time_local, e.end_time_local) {
                    open = s;
                    close = c;
                }
            }

            for start_naive in slot_starts(day, open, close) {
                let Some(starts_utc) = to_utc(start_naive, tz) else {
                    continue;
                };
                if starts_utc <= now {
                    continue;
                }
                candidates.push(Slot {
                    starts_local: to_local(starts_utc, tz),
                    starts_utc,
                });
            }
        }
    }

    let booked = store.booked_starts(resource_id, now - Duration::days(1))?;
    candidates.retain(|s| !booked.contains(&s.starts_utc));
    Ok(candidates)
}

/// Validation-time check used at the boundary before the coordinator is
/// invoked: the requested instant must be strictly in the future and in
/// the currently computed available set.
pub fn is_slot_available<S>(
    store: &S,
    resource_id: Uuid,
    starts_at_utc: DateTime<Utc>,
    window_days: u32,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<bool>
where
    S: RuleStore + ExceptionStore + BookingStore,
{
    if starts_at_utc <= now {
        return Ok(false);
    }
    let today = to_local(now, tz).date_naive();
    let slots = list_available_slots(store, resource_id, today, window_days, tz, now)?;
    Ok(slots.iter().any(|s| s.starts_utc == starts_at_utc))
}
