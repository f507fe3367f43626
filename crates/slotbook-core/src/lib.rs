//! # slotbook-core
//!
//! Availability computation and booking concurrency engine for shared
//! resources (rooms, equipment, staff).
//!
//! Given a resource's recurring weekly rules, date-specific exceptions,
//! and existing reservations, the engine computes the exact set of
//! bookable 45-minute slots over a rolling window, and reserves a slot
//! such that two concurrent requests for the same resource and instant
//! can never both succeed: an advisory per-slot lock collapses the race
//! window, and the storage layer's `(resource, starts_at_utc)` uniqueness
//! constraint is the ground truth.
//!
//! All rule and exception times are local wall-clock values in a single
//! configured IANA zone, passed explicitly (no ambient global); all
//! persisted instants are UTC.
//!
//! ## Modules
//!
//! - [`slots`] — pure local-time/UTC slot arithmetic with DST handling
//! - [`availability`] — rules + exceptions + bookings → open slots
//! - [`quota`] — per-user daily booking limit
//! - [`booking`] — the concurrency-safe booking coordinator
//! - [`cancel`] — cancellation authorizer
//! - [`lock`] — per-slot mutual exclusion with bounded wait and lease
//! - [`store`] — storage trait seams and the in-memory store
//! - [`notify`] — notification adapter boundary
//! - [`ics`] — RFC 5545 calendar export artifact
//! - [`message`] — confirmation message text
//! - [`model`] — domain types
//! - [`error`] — error taxonomy

pub mod availability;
pub mod booking;
pub mod cancel;
pub mod error;
pub mod ics;
pub mod lock;
pub mod message;
pub mod model;
pub mod notify;
pub mod quota;
pub mod slots;
pub mod store;

pub use availability::{is_slot_available, list_available_slots};
pub use booking::Coordinator;
pub use cancel::cancel_booking;
pub use error::{BookingError, NotifyError, Result};
pub use lock::{MemorySlotLocks, SlotKey, SlotLockGuard, SlotLocks, LOCK_LEASE, LOCK_WAIT};
pub use model::{
    AvailabilityException, AvailabilityRule, Booking, Resource, Slot, User, Weekday,
};
pub use notify::{Notifier, NullNotifier};
pub use quota::{user_daily_booking_count, DAILY_BOOKING_LIMIT};
pub use slots::{slot_starts, to_local, to_utc, SLOT_DURATION_MINUTES};
pub use store::{
    BookingStore, ExceptionStore, MemoryStore, ResourceStore, RuleStore, UserStore,
};
