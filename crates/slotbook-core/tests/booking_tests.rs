//! Tests for the booking coordinator: quota enforcement, the
//! double-booking race, and notification partial-failure semantics.

use std::sync::Barrier;

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use slotbook_core::error::NotifyError;
use slotbook_core::model::{Booking, Resource, User};
use slotbook_core::notify::Notifier;
use slotbook_core::store::{BookingStore, MemoryStore, ResourceStore, UserStore};
use slotbook_core::{BookingError, Coordinator, MemorySlotLocks, NullNotifier, DAILY_BOOKING_LIMIT};
use uuid::Uuid;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn berlin() -> Tz {
    "Europe/Berlin".parse().unwrap()
}

struct Fixture {
    store: MemoryStore,
    locks: MemorySlotLocks,
    resource_id: Uuid,
    user_id: Uuid,
}

fn fixture() -> Fixture {
    let store = MemoryStore::new();
    let resource_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    store
        .insert_resource(Resource {
            id: resource_id,
            owner_id: Uuid::new_v4(),
            name: "Studio A".into(),
            description: String::new(),
            is_active: true,
        })
        .unwrap();
    store
        .insert_user(User {
            id: user_id,
            username: "ada".into(),
            email: "ada@example.com".into(),
        })
        .unwrap();
    Fixture {
        store,
        locks: MemorySlotLocks::new(),
        resource_id,
        user_id,
    }
}

/// Monday 2026-08-03 09:00 Berlin as UTC.
fn slot_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 3, 7, 0, 0).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap()
}

// ── Commit path ─────────────────────────────────────────────────────────────

#[test]
fn create_booking_commits_and_returns_the_row() {
    let f = fixture();
    let coordinator = Coordinator::new(&f.store, &f.locks, &NullNotifier, berlin());

    let booking = coordinator
        .create_booking(f.user_id, f.resource_id, slot_start(), now(), None)
        .unwrap();

    assert_eq!(booking.resource_id, f.resource_id);
    assert_eq!(booking.user_id, f.user_id);
    assert_eq!(booking.starts_at_utc, slot_start());
    assert_eq!(booking.created_at_utc, now());
    assert_eq!(booking.ends_at_utc() - booking.starts_at_utc, Duration::minutes(45));

    // Durable: readable back from the store.
    assert_eq!(f.store.booking(booking.id).unwrap(), booking);
}

#[test]
fn booking_ids_are_unique_per_booking() {
    let f = fixture();
    let coordinator = Coordinator::new(&f.store, &f.locks, &NullNotifier, berlin());

    let a = coordinator
        .create_booking(f.user_id, f.resource_id, slot_start(), now(), None)
        .unwrap();
    let b = coordinator
        .create_booking(
            f.user_id,
            f.resource_id,
            slot_start() + Duration::minutes(45),
            now(),
            None,
        )
        .unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn unknown_resource_is_rejected() {
    let f = fixture();
    let coordinator = Coordinator::new(&f.store, &f.locks, &NullNotifier, berlin());

    let err = coordinator
        .create_booking(f.user_id, Uuid::new_v4(), slot_start(), now(), None)
        .unwrap_err();
    assert!(matches!(err, BookingError::NotFound { entity: "resource", .. }));
}

#[test]
fn same_slot_twice_sequentially_is_a_conflict() {
    let f = fixture();
    let other_user = Uuid::new_v4();
    f.store
        .insert_user(User {
            id: other_user,
            username: "grace".into(),
            email: "grace@example.com".into(),
        })
        .unwrap();
    let coordinator = Coordinator::new(&f.store, &f.locks, &NullNotifier, berlin());

    coordinator
        .create_booking(f.user_id, f.resource_id, slot_start(), now(), None)
        .unwrap();
    let err = coordinator
        .create_booking(other_user, f.resource_id, slot_start(), now(), None)
        .unwrap_err();
    assert!(matches!(err, BookingError::SlotAlreadyBooked));
}

// ── Quota ───────────────────────────────────────────────────────────────────

#[test]
fn sixth_booking_on_one_local_day_is_rejected_across_resources() {
    let f = fixture();
    let coordinator = Coordinator::new(&f.store, &f.locks, &NullNotifier, berlin());

    // Five existing bookings that local day, spread over other resources.
    for i in 0..DAILY_BOOKING_LIMIT {
        f.store
            .insert_booking(Booking {
                id: Uuid::new_v4(),
                resource_id: Uuid::new_v4(),
                user_id: f.user_id,
                starts_at_utc: slot_start() + Duration::minutes(45 * i as i64),
                created_at_utc: now(),
            })
            .unwrap();
    }

    let err = coordinator
        .create_booking(f.user_id, f.resource_id, slot_start() + Duration::hours(8), now(), None)
        .unwrap_err();
    assert!(matches!(err, BookingError::QuotaExceeded { limit: 5 }));
}

#[test]
fn quota_resets_on_the_next_local_day() {
    let f = fixture();
    let coordinator = Coordinator::new(&f.store, &f.locks, &NullNotifier, berlin());

    for i in 0..DAILY_BOOKING_LIMIT {
        f.store
            .insert_booking(Booking {
                id: Uuid::new_v4(),
                resource_id: Uuid::new_v4(),
                user_id: f.user_id,
                starts_at_utc: slot_start() + Duration::minutes(45 * i as i64),
                created_at_utc: now(),
            })
            .unwrap();
    }

    // Tuesday is a fresh local day.
    coordinator
        .create_booking(f.user_id, f.resource_id, slot_start() + Duration::days(1), now(), None)
        .unwrap();
}

#[test]
fn quota_counts_other_users_separately() {
    let f = fixture();
    let coordinator = Coordinator::new(&f.store, &f.locks, &NullNotifier, berlin());

    for i in 0..DAILY_BOOKING_LIMIT {
        f.store
            .insert_booking(Booking {
                id: Uuid::new_v4(),
                resource_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                starts_at_utc: slot_start() + Duration::minutes(45 * i as i64),
                created_at_utc: now(),
            })
            .unwrap();
    }

    coordinator
        .create_booking(f.user_id, f.resource_id, slot_start() + Duration::hours(8), now(), None)
        .unwrap();
}

// ── Concurrency ─────────────────────────────────────────────────────────────

#[test]
fn concurrent_identical_requests_yield_exactly_one_success() {
    let f = fixture();
    // Both racers need user rows.
    let other_user = Uuid::new_v4();
    f.store
        .insert_user(User {
            id: other_user,
            username: "grace".into(),
            email: "grace@example.com".into(),
        })
        .unwrap();

    let barrier = Barrier::new(2);
    let results: Vec<Result<Booking, BookingError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = [f.user_id, other_user]
            .into_iter()
            .map(|user| {
                let store = &f.store;
                let locks = &f.locks;
                let barrier = &barrier;
                scope.spawn(move || {
                    let coordinator = Coordinator::new(store, locks, &NullNotifier, berlin());
                    barrier.wait();
                    coordinator.create_booking(user, f.resource_id, slot_start(), now(), None)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one racer may win the slot");
    let failure = results.into_iter().find(Result::is_err).unwrap().unwrap_err();
    assert!(
        matches!(
            &failure,
            BookingError::SlotAlreadyBooked | BookingError::LockTimeout
        ),
        "loser must see a conflict or lock timeout, got: {failure}"
    );

    // The store holds exactly one row for the instant.
    let booked = f.store.booked_starts(f.resource_id, now()).unwrap();
    assert_eq!(booked.len(), 1);
}

// ── Notification semantics ──────────────────────────────────────────────────

struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn booking_confirmed(
        &self,
        _booking: &Booking,
        _resource: &Resource,
        _user: &User,
        _host: Option<&str>,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("smtp unreachable".into()))
    }
}

#[test]
fn notification_failure_does_not_fail_the_booking() {
    let f = fixture();
    let coordinator = Coordinator::new(&f.store, &f.locks, &FailingNotifier, berlin());

    let booking = coordinator
        .create_booking(f.user_id, f.resource_id, slot_start(), now(), None)
        .unwrap();

    // The reservation is durable despite the failed confirmation.
    assert!(f.store.booking(booking.id).is_ok());
}
