//! Storage seam: trait-per-entity access to the shared stores, plus an
//! in-memory implementation that enforces the relational invariants.
//!
//! The engine never talks to a database directly; it goes through these
//! traits. The two uniqueness invariants the storage layer must enforce
//! (not just application code) are:
//!
//! - bookings: unique on `(resource_id, starts_at_utc)`
//! - exceptions: unique on `(resource_id, date_local)`
//!
//! [`MemoryStore`] checks and inserts under a single mutex guard, the
//! in-memory analogue of a transactional insert under a unique index. A
//! database-backed implementation satisfies the same contract with real
//! unique indexes.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{BookingError, Result};
use crate::model::{AvailabilityException, AvailabilityRule, Booking, Resource, User};

pub trait ResourceStore: Send + Sync {
    fn resource(&self, id: Uuid) -> Result<Resource>;
    fn insert_resource(&self, resource: Resource) -> Result<()>;
    /// Active resources, name-ascending.
    fn list_active_resources(&self) -> Result<Vec<Resource>>;
}

pub trait RuleStore: Send + Sync {
    /// Active rules for a resource, ordered by (weekday, start time).
    fn active_rules(&self, resource_id: Uuid) -> Result<Vec<AvailabilityRule>>;
    fn insert_rule(&self, rule: AvailabilityRule) -> Result<()>;
}

pub trait ExceptionStore: Send + Sync {
    fn exceptions(&self, resource_id: Uuid) -> Result<Vec<AvailabilityException>>;
    /// Rejects a second exception for the same (resource, local date)
    /// with [`BookingError::DuplicateException`].
    fn insert_exception(&self, exception: AvailabilityException) -> Result<()>;
}

pub trait BookingStore: Send + Sync {
    /// Atomic insert. Rejects a duplicate `(resource_id, starts_at_utc)`
    /// with [`BookingError::SlotAlreadyBooked`] -- this is the
    /// authoritative conflict signal for the whole engine.
    fn insert_booking(&self, booking: Booking) -> Result<()>;
    fn booking(&self, id: Uuid) -> Result<Booking>;
    fn delete_booking(&self, id: Uuid) -> Result<()>;
    /// Booked start instants for a resource from `from_utc` onward.
    fn booked_starts(&self, resource_id: Uuid, from_utc: DateTime<Utc>)
        -> Result<HashSet<DateTime<Utc>>>;
    /// Bookings by one user whose start falls in `[from_utc, to_utc)`.
    fn count_user_bookings_between(
        &self,
        user_id: Uuid,
        from_utc: DateTime<Utc>,
        to_utc: DateTime<Utc>,
    ) -> Result<usize>;
    /// A user's bookings, start-descending.
    fn user_bookings(&self, user_id: Uuid) -> Result<Vec<Booking>>;
    /// Bookings across every resource owned by `owner_id`, start-descending.
    fn owner_bookings(&self, owner_id: Uuid) -> Result<Vec<Booking>>;
}

pub trait UserStore: Send + Sync {
    fn user(&self, id: Uuid) -> Result<User>;
    fn insert_user(&self, user: User) -> Result<()>;
}

#[derive(Default)]
struct Tables {
    resources: HashMap<Uuid, Resource>,
    rules: HashMap<Uuid, AvailabilityRule>,
    exceptions: HashMap<Uuid, AvailabilityException>,
    bookings: HashMap<Uuid, Booking>,
    users: HashMap<Uuid, User>,
}

/// In-memory store backing all five store traits.
///
/// Interior mutability behind one mutex keeps every uniqueness check and
/// its insert in the same critical section.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResourceStore for MemoryStore {
    fn resource(&self, id: Uuid) -> Result<Resource> {
        let tables = self.tables.lock().unwrap();
        tables
            .resources
            .get(&id)
            .cloned()
            .ok_or(BookingError::NotFound {
                entity: "resource",
                id,
            })
    }

    fn insert_resource(&self, resource: Resource) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.resources.insert(resource.id, resource);
        Ok(())
    }

    fn list_active_resources(&self) -> Result<Vec<Resource>> {
        let tables = self.tables.lock().unwrap();
        let mut out: Vec<Resource> = tables
            .resources
            .values()
            .filter(|r| r.is_active)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

impl RuleStore for MemoryStore {
    fn active_rules(&self, resource_id: Uuid) -> Result<Vec<AvailabilityRule>> {
        let tables = self.tables.lock().unwrap();
        let mut out: Vec<AvailabilityRule> = tables
            .rules
            .values()
            .filter(|r| r.resource_id == resource_id && r.is_active)
            .cloned()
            .collect();
        out.sort_by_key(|r| (r.weekday as u8, r.start_time_local));
        Ok(out)
    }

    fn insert_rule(&self, rule: AvailabilityRule) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.rules.insert(rule.id, rule);
        Ok(())
    }
}

impl ExceptionStore for MemoryStore {
    fn exceptions(&self, resource_id: Uuid) -> Result<Vec<AvailabilityException>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .exceptions
            .values()
            .filter(|e| e.resource_id == resource_id)
            .cloned()
            .collect())
    }

    fn insert_exception(&self, exception: AvailabilityException) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let duplicate = tables.exceptions.values().any(|e| {
            e.resource_id == exception.resource_id && e.date_local == exception.date_local
        });
        if duplicate {
            return Err(BookingError::DuplicateException {
                date: exception.date_local,
            });
        }
        tables.exceptions.insert(exception.id, exception);
        Ok(())
    }
}

impl BookingStore for MemoryStore {
    fn insert_booking(&self, booking: Booking) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        let taken = tables.bookings.values().any(|b| {
            b.resource_id == booking.resource_id && b.starts_at_utc == booking.starts_at_utc
        });
        if taken {
            return Err(BookingError::SlotAlreadyBooked);
        }
        tables.bookings.insert(booking.id, booking);
        Ok(())
    }

    fn booking(&self, id: Uuid) -> Result<Booking> {
        let tables = self.tables.lock().unwrap();
        tables
            .bookings
            .get(&id)
            .cloned()
            .ok_or(BookingError::NotFound {
                entity: "booking",
                id,
            })
    }

    fn delete_booking(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables
            .bookings
            .remove(&id)
            .map(|_| ())
            .ok_or(BookingError::NotFound {
                entity: "booking",
                id,
            })
    }

    fn booked_starts(
        &self,
        resource_id: Uuid,
        from_utc: DateTime<Utc>,
    ) -> Result<HashSet<DateTime<Utc>>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .bookings
            .values()
            .filter(|b| b.resource_id == resource_id && b.starts_at_utc >= from_utc)
            .map(|b| b.starts_at_utc)
            .collect())
    }

    fn count_user_bookings_between(
        &self,
        user_id: Uuid,
        from_utc: DateTime<Utc>,
        to_utc: DateTime<Utc>,
    ) -> Result<usize> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .bookings
            .values()
            .filter(|b| b.user_id == user_id && b.starts_at_utc >= from_utc && b.starts_at_utc < to_utc)
            .count())
    }

    fn user_bookings(&self, user_id: Uuid) -> Result<Vec<Booking>> {
        let tables = self.tables.lock().unwrap();
        let mut out: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by_key(|b| std::cmp::Reverse(b.starts_at_utc));
        Ok(out)
    }

    fn owner_bookings(&self, owner_id: Uuid) -> Result<Vec<Booking>> {
        let tables = self.tables.lock().unwrap();
        let owned: HashSet<Uuid> = tables
            .resources
            .values()
            .filter(|r| r.owner_id == owner_id)
            .map(|r| r.id)
            .collect();
        let mut out: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| owned.contains(&b.resource_id))
            .cloned()
            .collect();
        out.sort_by_key(|b| std::cmp::Reverse(b.starts_at_utc));
        Ok(out)
    }
}

impl UserStore for MemoryStore {
    fn user(&self, id: Uuid) -> Result<User> {
        let tables = self.tables.lock().unwrap();
        tables.users.get(&id).cloned().ok_or(BookingError::NotFound {
            entity: "user",
            id,
        })
    }

    fn insert_user(&self, user: User) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.users.insert(user.id, user);
        Ok(())
    }
}
