//! Persistence for seat records.
//!
//! The store owns every [`Seat`]; nothing else mutates seat status. Two
//! backends exist: Postgres for deployments and an in-process map for tests
//! and local runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::seat::{row_for, Seat, UnknownStatus, TOTAL_SEATS};

pub use memory::MemorySeatStore;
pub use postgres::PgSeatStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("corrupt seat record: {0}")]
    Corrupt(#[from] UnknownStatus),
}

/// Result of an all-or-nothing booking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookOutcome {
    Booked,
    /// At least one seat was no longer available; nothing changed.
    Conflict,
}

#[async_trait]
pub trait SeatStore: Send + Sync + 'static {
    /// Every seat. Callers must not depend on the order.
    async fn list_all(&self) -> Result<Vec<Seat>, StoreError>;

    /// Available seats ordered by `(row, seat_number)`.
    async fn list_available(&self) -> Result<Vec<Seat>, StoreError>;

    /// Mark a single seat booked. Re-booking a booked seat succeeds;
    /// returns `false` only when the seat does not exist.
    async fn mark_booked(&self, seat_number: i32) -> Result<bool, StoreError>;

    /// Book all of `seat_numbers` if every one is still available.
    async fn try_book(&self, seat_numbers: &[i32]) -> Result<BookOutcome, StoreError>;

    /// Set every seat back to available. Returns the number of records touched.
    async fn reset_all(&self) -> Result<u64, StoreError>;

    /// Insert the venue layout when the store holds no seats.
    /// Returns the number of seats created.
    async fn seed_if_empty(&self) -> Result<u64, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;
}

/// `(seat_number, row)` pairs for a freshly seeded venue.
pub fn venue_layout() -> Vec<(i32, i32)> {
    (1..=TOTAL_SEATS).map(|n| (n, row_for(n))).collect()
}
