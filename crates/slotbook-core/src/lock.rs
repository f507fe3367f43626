//! Mutual exclusion on (resource, start instant) keys.
//!
//! The lock narrows the race window before the storage uniqueness
//! constraint takes effect, so contending callers get a fast rejection
//! instead of a constraint-violation error path. It is an advisory layer:
//! correctness always rests on the storage constraint, never on the lock
//! alone.
//!
//! Acquisition waits a bounded time; a held lock auto-expires after its
//! lease so a crashed holder cannot deadlock the key. [`MemorySlotLocks`]
//! models this contract in-process; a distributed lock service plugs in
//! behind the same trait for multi-process deployments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{BookingError, Result};

/// Bounded wait to acquire a slot lock.
pub const LOCK_WAIT: Duration = Duration::from_secs(5);
/// Lease after which a held lock expires and may be taken over.
pub const LOCK_LEASE: Duration = Duration::from_secs(10);

/// Lock key: one reservable instant on one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub resource_id: Uuid,
    pub starts_at_utc: DateTime<Utc>,
}

/// Held lock. Released on drop, on every exit path including panics.
pub struct SlotLockGuard {
    _release: Box<dyn Send + 'static>,
}

impl std::fmt::Debug for SlotLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotLockGuard").finish_non_exhaustive()
    }
}

impl SlotLockGuard {
    pub fn new(release: impl Send + 'static) -> Self {
        Self {
            _release: Box::new(release),
        }
    }
}

pub trait SlotLocks: Send + Sync {
    /// Acquire the lock for `key`, waiting at most `wait`. The returned
    /// guard's lease lasts `lease`; past that the key becomes acquirable
    /// again even if the guard is still alive.
    ///
    /// # Errors
    /// [`BookingError::LockTimeout`] if the wait deadline passes first.
    fn acquire(&self, key: SlotKey, wait: Duration, lease: Duration) -> Result<SlotLockGuard>;
}

#[derive(Debug, Clone, Copy)]
struct Lease {
    token: u64,
    expires_at: Instant,
}

#[derive(Default)]
struct LockTable {
    held: Mutex<HashMap<SlotKey, Lease>>,
    freed: Condvar,
}

/// In-process implementation of [`SlotLocks`].
#[derive(Default, Clone)]
pub struct MemorySlotLocks {
    table: Arc<LockTable>,
    next_token: Arc<AtomicU64>,
}

impl MemorySlotLocks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotLocks for MemorySlotLocks {
    fn acquire(&self, key: SlotKey, wait: Duration, lease: Duration) -> Result<SlotLockGuard> {
        let deadline = Instant::now() + wait;
        let mut held = self.table.held.lock().unwrap();

        loop {
            let now = Instant::now();
            match held.get(&key) {
                // Live lease held by someone else: wait until it is
                // released, expires, or our deadline passes.
                Some(current) if current.expires_at > now => {
                    if now >= deadline {
                        return Err(BookingError::LockTimeout);
                    }
                    let sleep = (deadline.min(current.expires_at)) - now;
                    let (guard, _timed_out) =
                        self.table.freed.wait_timeout(held, sleep).unwrap();
                    held = guard;
                }
                // Free, or an expired lease left by a dead holder: take it.
                _ => {
                    let token = self.next_token.fetch_add(1, Ordering::Relaxed);
                    held.insert(
                        key,
                        Lease {
                            token,
                            expires_at: now + lease,
                        },
                    );
                    return Ok(SlotLockGuard::new(MemoryGuard {
                        table: Arc::clone(&self.table),
                        key,
                        token,
                    }));
                }
            }
        }
    }
}

struct MemoryGuard {
    table: Arc<LockTable>,
    key: SlotKey,
    token: u64,
}

impl Drop for MemoryGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.table.held.lock() {
            // Only remove our own lease: if it expired and the key was
            // taken over, the new holder's lease must survive this drop.
            if held.get(&self.key).is_some_and(|l| l.token == self.token) {
                held.remove(&self.key);
            }
        }
        self.table.freed.notify_all();
    }
}
