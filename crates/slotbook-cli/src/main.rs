//! `slotbook` CLI — list availability, book, and cancel slots against a
//! JSON state file.
//!
//! ## Usage
//!
//! ```sh
//! # Active resources
//! slotbook --state demo.json resources
//!
//! # Open slots over the next 14 days
//! slotbook --state demo.json slots --resource <uuid>
//!
//! # Book a slot (start instant as RFC 3339 UTC)
//! slotbook --state demo.json book --resource <uuid> --user <uuid> \
//!     --start 2026-08-10T07:00:00Z
//!
//! # Cancel (booker or resource owner only)
//! slotbook --state demo.json cancel --booking <uuid> --user <uuid>
//!
//! # A user's bookings / all bookings on an owner's resources
//! slotbook --state demo.json bookings --user <uuid>
//! slotbook --state demo.json bookings --owner <uuid>
//!
//! # Re-render the calendar artifact for a booking
//! slotbook --state demo.json ics --booking <uuid> -o appointment.ics
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use slotbook_core::error::NotifyError;
use slotbook_core::model::{AvailabilityException, AvailabilityRule, Booking, Resource, User};
use slotbook_core::notify::Notifier;
use slotbook_core::store::{
    BookingStore, ExceptionStore, MemoryStore, ResourceStore, RuleStore, UserStore,
};
use slotbook_core::{
    cancel_booking, ics, is_slot_available, list_available_slots, message, to_local,
    BookingError, Coordinator, MemorySlotLocks,
};

/// Window used when validating a requested instant before booking.
const BOOKING_WINDOW_DAYS: u32 = 21;

#[derive(Parser)]
#[command(name = "slotbook", version, about = "Resource slot booking CLI")]
struct Cli {
    /// JSON state file holding resources, users, rules, exceptions,
    /// and bookings
    #[arg(long, global = true, default_value = "slotbook.json")]
    state: PathBuf,

    /// IANA timezone for all local times
    #[arg(long, global = true, default_value = "Europe/Berlin")]
    tz: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List active resources
    Resources,
    /// List open slots for a resource
    Slots {
        #[arg(long)]
        resource: Uuid,
        /// Days ahead to scan
        #[arg(long, default_value_t = 14)]
        days: u32,
    },
    /// Book a slot
    Book {
        #[arg(long)]
        resource: Uuid,
        #[arg(long)]
        user: Uuid,
        /// Slot start, RFC 3339 (e.g. 2026-08-10T07:00:00Z)
        #[arg(long)]
        start: String,
        /// Display host for the URL embedded in the calendar artifact
        #[arg(long)]
        host: Option<String>,
        /// Where to write the calendar artifact
        #[arg(long, default_value = "appointment.ics")]
        ics_out: PathBuf,
    },
    /// Cancel a booking
    Cancel {
        #[arg(long)]
        booking: Uuid,
        /// Acting user (the booker or the resource owner)
        #[arg(long)]
        user: Uuid,
    },
    /// List bookings for a user or a resource owner
    Bookings {
        #[arg(long, conflicts_with = "owner")]
        user: Option<Uuid>,
        #[arg(long)]
        owner: Option<Uuid>,
    },
    /// Render the calendar artifact for an existing booking
    Ics {
        #[arg(long)]
        booking: Uuid,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        host: Option<String>,
    },
}

/// On-disk snapshot of every store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct State {
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    rules: Vec<AvailabilityRule>,
    #[serde(default)]
    exceptions: Vec<AvailabilityException>,
    #[serde(default)]
    bookings: Vec<Booking>,
}

impl State {
    fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read state file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid state file {}", path.display()))
    }

    fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("serializing state")?;
        std::fs::write(path, raw)
            .with_context(|| format!("cannot write state file {}", path.display()))
    }

    /// Materialize the snapshot into the in-memory store.
    fn to_store(&self) -> Result<MemoryStore> {
        let store = MemoryStore::new();
        for r in &self.resources {
            store.insert_resource(r.clone())?;
        }
        for u in &self.users {
            store.insert_user(u.clone())?;
        }
        for rule in &self.rules {
            store.insert_rule(rule.clone())?;
        }
        for e in &self.exceptions {
            store.insert_exception(e.clone())?;
        }
        for b in &self.bookings {
            store.insert_booking(b.clone())?;
        }
        Ok(store)
    }
}

/// Prints the confirmation to stdout in place of a mail transport.
struct ConsoleNotifier {
    tz: Tz,
}

impl Notifier for ConsoleNotifier {
    fn booking_confirmed(
        &self,
        booking: &Booking,
        resource: &Resource,
        user: &User,
        _host: Option<&str>,
    ) -> std::result::Result<(), NotifyError> {
        println!("To: {}", user.email);
        println!("Subject: {}", message::CONFIRMATION_SUBJECT);
        println!();
        println!("{}", message::confirmation_body(booking, resource, self.tz));
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let tz: Tz = cli
        .tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid IANA timezone: {}", cli.tz))?;

    match cli.command {
        Commands::Resources => cmd_resources(&cli.state),
        Commands::Slots { resource, days } => cmd_slots(&cli.state, resource, days, tz),
        Commands::Book {
            resource,
            user,
            start,
            host,
            ics_out,
        } => cmd_book(&cli.state, resource, user, &start, host.as_deref(), &ics_out, tz),
        Commands::Cancel { booking, user } => cmd_cancel(&cli.state, booking, user),
        Commands::Bookings { user, owner } => cmd_bookings(&cli.state, user, owner, tz),
        Commands::Ics {
            booking,
            output,
            host,
        } => cmd_ics(&cli.state, booking, output.as_deref(), host.as_deref()),
    }
}

fn cmd_resources(state_path: &Path) -> Result<()> {
    let store = State::load(state_path)?.to_store()?;
    for resource in store.list_active_resources()? {
        println!("{}  {}", resource.id, resource.name);
    }
    Ok(())
}

fn cmd_slots(state_path: &Path, resource: Uuid, days: u32, tz: Tz) -> Result<()> {
    let store = State::load(state_path)?.to_store()?;
    // Unknown resources still error even though the resolver itself only
    // needs the id.
    store.resource(resource)?;

    let now = Utc::now();
    let today = to_local(now, tz).date_naive();
    let slots = list_available_slots(&store, resource, today, days, tz, now)?;
    for slot in slots {
        println!(
            "{}  {}",
            slot.starts_utc.format("%Y-%m-%dT%H:%M:%SZ"),
            slot.starts_local.format("%Y-%m-%d %H:%M %Z")
        );
    }
    Ok(())
}

fn cmd_book(
    state_path: &Path,
    resource: Uuid,
    user: Uuid,
    start: &str,
    host: Option<&str>,
    ics_out: &Path,
    tz: Tz,
) -> Result<()> {
    let mut state = State::load(state_path)?;
    let store = state.to_store()?;
    let starts_at_utc: DateTime<Utc> = start
        .parse::<DateTime<chrono::FixedOffset>>()
        .with_context(|| format!("invalid start instant: {start}"))?
        .with_timezone(&Utc);

    let now = Utc::now();
    if !is_slot_available(&store, resource, starts_at_utc, BOOKING_WINDOW_DAYS, tz, now)? {
        bail!("{}", BookingError::InvalidSlot);
    }

    let locks = MemorySlotLocks::new();
    let notifier = ConsoleNotifier { tz };
    let coordinator = Coordinator::new(&store, &locks, &notifier, tz);
    let booking = coordinator.create_booking(user, resource, starts_at_utc, now, host)?;

    state.bookings.push(booking.clone());
    state.save(state_path)?;

    // The artifact is best-effort, like the confirmation itself: the
    // reservation is already durable.
    let resource_row = store.resource(resource)?;
    if let Err(err) = std::fs::write(ics_out, ics::render(&booking, &resource_row, host, now)) {
        eprintln!("warning: cannot write {}: {err}", ics_out.display());
    }

    println!("booked {}", booking.id);
    Ok(())
}

fn cmd_cancel(state_path: &Path, booking: Uuid, user: Uuid) -> Result<()> {
    let mut state = State::load(state_path)?;
    let store = state.to_store()?;

    // NotAuthorized is reported exactly like a missing booking so the
    // command leaks nothing about other users' bookings.
    match cancel_booking(&store, booking, user) {
        Ok(()) => {}
        Err(BookingError::NotAuthorized) | Err(BookingError::NotFound { .. }) => {
            bail!("booking not found: {booking}")
        }
        Err(err) => return Err(err.into()),
    }

    state.bookings.retain(|b| b.id != booking);
    state.save(state_path)?;

    println!("cancelled {booking}");
    Ok(())
}

fn cmd_bookings(state_path: &Path, user: Option<Uuid>, owner: Option<Uuid>, tz: Tz) -> Result<()> {
    let store = State::load(state_path)?.to_store()?;
    let bookings = match (user, owner) {
        (Some(user), None) => store.user_bookings(user)?,
        (None, Some(owner)) => store.owner_bookings(owner)?,
        _ => bail!("pass exactly one of --user or --owner"),
    };
    for booking in bookings {
        let resource = store.resource(booking.resource_id)?;
        println!(
            "{}  {}  {}",
            booking.id,
            booking.starts_at_local(tz).format("%Y-%m-%d %H:%M %Z"),
            resource.name
        );
    }
    Ok(())
}

fn cmd_ics(
    state_path: &Path,
    booking: Uuid,
    output: Option<&Path>,
    host: Option<&str>,
) -> Result<()> {
    let store = State::load(state_path)?.to_store()?;
    let booking = store.booking(booking)?;
    let resource = store.resource(booking.resource_id)?;
    let artifact = ics::render(&booking, &resource, host, Utc::now());
    match output {
        Some(path) => std::fs::write(path, artifact)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => print!("{artifact}"),
    }
    Ok(())
}
