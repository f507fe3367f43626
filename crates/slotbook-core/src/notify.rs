//! Notification adapter boundary.
//!
//! The coordinator calls [`Notifier::booking_confirmed`] once per
//! committed booking, after the lock is released. Implementations own the
//! transport (mail, webhook, console); they typically attach the
//! [`crate::ics`] artifact and the [`crate::message`] body. Failures are
//! logged by the coordinator and never fail the booking.

use crate::error::NotifyError;
use crate::model::{Booking, Resource, User};

pub trait Notifier: Send + Sync {
    fn booking_confirmed(
        &self,
        booking: &Booking,
        resource: &Resource,
        user: &User,
        host: Option<&str>,
    ) -> Result<(), NotifyError>;
}

/// Discards every confirmation. For tests and headless use.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn booking_confirmed(
        &self,
        _booking: &Booking,
        _resource: &Resource,
        _user: &User,
        _host: Option<&str>,
    ) -> Result<(), NotifyError> {
        Ok(())
    }
}
