//! Per-user daily booking quota.

use chrono::NaiveDate;
use chrono_tz::Tz;
use uuid::Uuid;

use crate::error::Result;
use crate::slots::local_day_bounds;
use crate::store::BookingStore;

/// Maximum bookings one user may hold per local day, across all resources.
pub const DAILY_BOOKING_LIMIT: usize = 5;

/// Count a user's bookings whose UTC start falls within the given local
/// civil day. Pure read; re-checked inside the coordinator's critical
/// path before committing.
///
/// A day whose local midnight does not exist in `tz` counts as empty.
pub fn user_daily_booking_count<S: BookingStore>(
    store: &S,
    user_id: Uuid,
    day_local: NaiveDate,
    tz: Tz,
) -> Result<usize> {
    let Some((from_utc, to_utc)) = local_day_bounds(day_local, tz) else {
        return Ok(0);
    };
    store.count_user_bookings_between(user_id, from_utc, to_utc)
}
