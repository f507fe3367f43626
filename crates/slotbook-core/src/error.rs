//! Error types for booking operations.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the booking engine. All variants are local to a
/// single request; none require process-level recovery.
#[derive(Error, Debug)]
pub enum BookingError {
    /// The user already holds the maximum number of bookings for that
    /// local day. User-correctable.
    #[error("daily booking limit reached (max {limit}/day)")]
    QuotaExceeded { limit: usize },

    /// The (resource, start instant) pair is already taken. This is the
    /// authoritative conflict signal, raised by the storage uniqueness
    /// check. User-correctable: pick another slot.
    #[error("this slot is already booked")]
    SlotAlreadyBooked,

    /// The slot lock could not be acquired within the bounded wait.
    /// Transient contention: the caller may retry the same slot.
    #[error("timed out waiting for the slot lock")]
    LockTimeout,

    /// The acting user is neither the booking's user nor the resource
    /// owner. Boundaries should render this as "not found" to avoid
    /// leaking existence.
    #[error("not allowed")]
    NotAuthorized,

    /// The requested instant is not in the currently available set, or is
    /// in the past. Raised at validation time, before the coordinator runs.
    #[error("slot is not available")]
    InvalidSlot,

    /// A second exception for the same (resource, local date).
    #[error("an exception already exists for {date}")]
    DuplicateException { date: NaiveDate },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
}

/// Errors from the notification adapter. Never propagated as booking
/// failures; the coordinator logs and swallows them.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("confirmation delivery failed: {0}")]
    Delivery(String),
}

pub type Result<T> = std::result::Result<T, BookingError>;
