//! Confirmation message text.

use chrono_tz::Tz;

use crate::model::{Booking, Resource};

pub const CONFIRMATION_SUBJECT: &str = "Your appointment is confirmed";

/// Plain-text confirmation body with the booking's local times.
pub fn confirmation_body(booking: &Booking, resource: &Resource, tz: Tz) -> String {
    let starts_local = booking.starts_at_local(tz);
    let ends_local = booking.ends_at_local(tz);
    format!(
        "Your appointment is confirmed.\n\n\
         Resource: {}\n\
         Starts (local): {}\n\
         Ends (local): {}\n\
         \n\
         ICS file is attached for calendar import.",
        resource.name,
        starts_local.format("%Y-%m-%d %H:%M"),
        ends_local.format("%Y-%m-%d %H:%M"),
    )
}
