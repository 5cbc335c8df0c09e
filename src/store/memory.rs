use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{venue_layout, BookOutcome, SeatStore, StoreError};
use crate::models::{Seat, SeatStatus};

/// In-process seat store keyed by seat number.
///
/// Every mutation takes the write lock for its whole duration, so
/// `try_book` is a single check-and-set.
#[derive(Clone, Default)]
pub struct MemorySeatStore {
    seats: Arc<RwLock<BTreeMap<i32, Seat>>>,
}

impl MemorySeatStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(seats: impl Iterator<Item = Seat>) -> Vec<Seat> {
        let mut out: Vec<Seat> = seats.collect();
        out.sort_by_key(|s| (s.row, s.seat_number));
        out
    }
}

#[async_trait]
impl SeatStore for MemorySeatStore {
    async fn list_all(&self) -> Result<Vec<Seat>, StoreError> {
        let seats = self.seats.read().await;
        Ok(Self::sorted(seats.values().cloned()))
    }

    async fn list_available(&self) -> Result<Vec<Seat>, StoreError> {
        let seats = self.seats.read().await;
        Ok(Self::sorted(seats.values().filter(|s| s.is_available()).cloned()))
    }

    async fn mark_booked(&self, seat_number: i32) -> Result<bool, StoreError> {
        let mut seats = self.seats.write().await;
        match seats.get_mut(&seat_number) {
            Some(seat) => {
                seat.status = SeatStatus::Booked;
                seat.updated_at = Utc::now().naive_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn try_book(&self, seat_numbers: &[i32]) -> Result<BookOutcome, StoreError> {
        let mut seats = self.seats.write().await;
        let all_free = seat_numbers
            .iter()
            .all(|n| seats.get(n).is_some_and(Seat::is_available));
        if !all_free {
            return Ok(BookOutcome::Conflict);
        }

        let now = Utc::now().naive_utc();
        for n in seat_numbers {
            if let Some(seat) = seats.get_mut(n) {
                seat.status = SeatStatus::Booked;
                seat.updated_at = now;
            }
        }
        Ok(BookOutcome::Booked)
    }

    async fn reset_all(&self) -> Result<u64, StoreError> {
        let mut seats = self.seats.write().await;
        let now = Utc::now().naive_utc();
        for seat in seats.values_mut() {
            seat.status = SeatStatus::Available;
            seat.updated_at = now;
        }
        Ok(seats.len() as u64)
    }

    async fn seed_if_empty(&self) -> Result<u64, StoreError> {
        let mut seats = self.seats.write().await;
        if !seats.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().naive_utc();
        for (seat_number, row) in venue_layout() {
            seats.insert(
                seat_number,
                Seat {
                    id: seat_number as i64,
                    row,
                    seat_number,
                    status: SeatStatus::Available,
                    updated_at: now,
                },
            );
        }
        Ok(seats.len() as u64)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.seats.read().await.len() as i64)
    }
}
