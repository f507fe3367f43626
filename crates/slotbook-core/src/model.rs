//! Domain model: resources, availability rules, exceptions, bookings.
//!
//! All persisted instants are UTC; all rule and exception times are local
//! wall-clock values in the configured zone. Booking ids are random v4
//! UUIDs so they leak no ordering or count information.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::slots::{slot_duration, to_local};

/// A bookable entity (room, equipment, person) owned by a principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    /// The single owning principal. Owners may cancel any booking on
    /// their resource.
    pub owner_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Soft-deactivation flag; inactive resources are hidden from
    /// listings but keep their bookings.
    pub is_active: bool,
}

/// Day of week for availability rules, Monday = 0 through Sunday = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl Weekday {
    /// The weekday of a calendar date.
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

/// Recurring weekly open-hours definition for a resource.
///
/// Multiple rules per weekday are allowed (split shifts) and are
/// independent; no overlap detection is performed. `start_time_local <
/// end_time_local` is not enforced -- an inverted interval produces zero
/// slots through the arithmetic's loop condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub weekday: Weekday,
    pub start_time_local: NaiveTime,
    pub end_time_local: NaiveTime,
    pub is_active: bool,
}

/// A date-specific override for a resource: either the whole date is
/// closed, or the open interval for that date is replaced.
///
/// At most one exception may exist per (resource, local date); the store
/// enforces that. Override times only apply when `is_closed` is false and
/// both are present; otherwise the matching rules' own hours stand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityException {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub date_local: NaiveDate,
    pub is_closed: bool,
    #[serde(default)]
    pub start_time_local: Option<NaiveTime>,
    #[serde(default)]
    pub end_time_local: Option<NaiveTime>,
}

/// A committed reservation of one slot by one user.
///
/// Never updated in place: rescheduling is cancel + recreate. The end
/// instant is derived from the fixed slot duration, not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub user_id: Uuid,
    pub starts_at_utc: DateTime<Utc>,
    pub created_at_utc: DateTime<Utc>,
}

impl Booking {
    pub fn ends_at_utc(&self) -> DateTime<Utc> {
        self.starts_at_utc + slot_duration()
    }

    pub fn starts_at_local(&self, tz: Tz) -> DateTime<Tz> {
        to_local(self.starts_at_utc, tz)
    }

    pub fn ends_at_local(&self, tz: Tz) -> DateTime<Tz> {
        to_local(self.ends_at_utc(), tz)
    }
}

/// Minimal user record at the identity boundary. Identity management
/// itself lives outside this crate; the engine only needs a stable id and
/// a delivery address for confirmations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// A candidate reservable instant, carrying both representations.
///
/// Derived fresh on every availability query; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub starts_local: DateTime<Tz>,
    pub starts_utc: DateTime<Utc>,
}
