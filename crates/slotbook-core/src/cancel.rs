//! Cancellation: permission check plus unconditional removal.

use uuid::Uuid;

use crate::error::{BookingError, Result};
use crate::store::{BookingStore, ResourceStore};

/// Delete a booking on behalf of `acting_user`.
///
/// Permitted only for the booking's own user or the owner of the
/// booking's resource. No soft-delete, no reschedule: a cancelled slot is
/// simply bookable again.
///
/// # Errors
/// [`BookingError::NotFound`] for an unknown booking,
/// [`BookingError::NotAuthorized`] for anyone else. Boundaries should
/// render the latter as "not found" to avoid leaking existence.
pub fn cancel_booking<S: BookingStore + ResourceStore>(
    store: &S,
    booking_id: Uuid,
    acting_user: Uuid,
) -> Result<()> {
    let booking = store.booking(booking_id)?;
    let resource = store.resource(booking.resource_id)?;
    if booking.user_id != acting_user && resource.owner_id != acting_user {
        return Err(BookingError::NotAuthorized);
    }
    store.delete_booking(booking_id)
}
