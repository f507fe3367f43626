//! Booking coordinator: serializes reservation attempts per slot and
//! commits them under the storage uniqueness constraint.
//!
//! Safe under arbitrary concurrency. The slot lock collapses the race
//! window so contenders get a fast rejection; the store's
//! `(resource, starts_at_utc)` uniqueness check remains the ground truth
//! even if two processes race past an expired lock.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{BookingError, Result};
use crate::lock::{SlotKey, SlotLocks, LOCK_LEASE, LOCK_WAIT};
use crate::model::Booking;
use crate::notify::Notifier;
use crate::quota::{user_daily_booking_count, DAILY_BOOKING_LIMIT};
use crate::slots::to_local;
use crate::store::{BookingStore, ResourceStore, UserStore};

/// Serializes concurrent reservation attempts and commits bookings.
pub struct Coordinator<'a, S, L, N>
where
    S: BookingStore + ResourceStore + UserStore,
    L: SlotLocks,
    N: Notifier,
{
    store: &'a S,
    locks: &'a L,
    notifier: &'a N,
    tz: Tz,
}

impl<'a, S, L, N> Coordinator<'a, S, L, N>
where
    S: BookingStore + ResourceStore + UserStore,
    L: SlotLocks,
    N: Notifier,
{
    pub fn new(store: &'a S, locks: &'a L, notifier: &'a N, tz: Tz) -> Self {
        Self {
            store,
            locks,
            notifier,
            tz,
        }
    }

    /// Reserve the slot at `starts_at_utc` on `resource_id` for `user_id`.
    ///
    /// Every failing step aborts the whole operation with no partial
    /// state. Notification runs after commit, outside the lock, and its
    /// failure never surfaces as a booking failure.
    ///
    /// # Errors
    /// [`BookingError::QuotaExceeded`] past the daily limit,
    /// [`BookingError::LockTimeout`] on lock contention,
    /// [`BookingError::SlotAlreadyBooked`] if the instant is taken,
    /// [`BookingError::NotFound`] for an unknown resource or user.
    pub fn create_booking(
        &self,
        user_id: Uuid,
        resource_id: Uuid,
        starts_at_utc: DateTime<Utc>,
        now: DateTime<Utc>,
        host: Option<&str>,
    ) -> Result<Booking> {
        let resource = self.store.resource(resource_id)?;
        let user = self.store.user(user_id)?;

        let day_local = to_local(starts_at_utc, self.tz).date_naive();
        if user_daily_booking_count(self.store, user_id, day_local, self.tz)?
            >= DAILY_BOOKING_LIMIT
        {
            return Err(BookingError::QuotaExceeded {
                limit: DAILY_BOOKING_LIMIT,
            });
        }

        let key = SlotKey {
            resource_id,
            starts_at_utc,
        };
        let booking = {
            let _guard = self.locks.acquire(key, LOCK_WAIT, LOCK_LEASE)?;
            let booking = Booking {
                id: Uuid::new_v4(),
                resource_id,
                user_id,
                starts_at_utc,
                created_at_utc: now,
            };
            self.store.insert_booking(booking.clone())?;
            booking
            // Lock released here, before notification.
        };

        info!(
            booking = %booking.id,
            resource = %resource.id,
            starts_at = %starts_at_utc,
            "booking committed"
        );

        // Best-effort: the reservation is already durable.
        if let Err(err) = self
            .notifier
            .booking_confirmed(&booking, &resource, &user, host)
        {
            warn!(booking = %booking.id, error = %err, "confirmation delivery failed");
        }

        Ok(booking)
    }
}
