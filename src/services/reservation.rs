use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::CacheService;
use crate::models::Seat;
use crate::services::allocation::{self, AllocationError};
use crate::store::{BookOutcome, SeatStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("invalid number of seats")]
    InvalidRequest,
    #[error("not enough seats available")]
    InsufficientSeats,
    #[error("gave up after {attempts} conflicting attempts")]
    Contention { attempts: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AllocationError> for ReservationError {
    fn from(e: AllocationError) -> Self {
        match e {
            AllocationError::InvalidRequest => ReservationError::InvalidRequest,
            AllocationError::InsufficientSeats => ReservationError::InsufficientSeats,
        }
    }
}

/// Ties the allocator to the seat store.
#[derive(Clone)]
pub struct ReservationService {
    store: Arc<dyn SeatStore>,
    cache: CacheService,
    max_attempts: u32,
}

impl ReservationService {
    pub fn new(store: Arc<dyn SeatStore>, cache: CacheService, max_attempts: u32) -> Self {
        Self {
            store,
            cache,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn SeatStore> {
        &self.store
    }

    pub async fn seed(&self) -> Result<u64, StoreError> {
        let created = self.store.seed_if_empty().await?;
        if created > 0 {
            self.cache.invalidate_seats().await;
        }
        Ok(created)
    }

    pub async fn list_seats(&self) -> Result<Vec<Seat>, StoreError> {
        self.store.list_all().await
    }

    /// Book `count` seats and return their numbers in selection order.
    ///
    /// Each attempt allocates against a fresh snapshot and commits with an
    /// all-or-nothing conditional update. A conflict means another request
    /// took one of the chosen seats in between, so the selection is redone.
    pub async fn reserve(&self, count: u32) -> Result<Vec<i32>, ReservationError> {
        allocation::validate_count(count)?;

        for attempt in 1..=self.max_attempts {
            let available = self.store.list_available().await?;
            let selected = allocation::allocate(&available, count)?;
            let numbers: Vec<i32> = selected.iter().map(|s| s.seat_number).collect();

            match self.store.try_book(&numbers).await? {
                BookOutcome::Booked => {
                    info!("Reserved seats {:?} (attempt {})", numbers, attempt);
                    self.cache.invalidate_seats().await;
                    return Ok(numbers);
                }
                BookOutcome::Conflict => {
                    warn!(
                        "Seats {:?} taken concurrently, reselecting (attempt {}/{})",
                        numbers, attempt, self.max_attempts
                    );
                }
            }
        }

        Err(ReservationError::Contention {
            attempts: self.max_attempts,
        })
    }

    pub async fn reset(&self) -> Result<u64, StoreError> {
        let affected = self.store.reset_all().await?;
        self.cache.invalidate_seats().await;
        info!("Reset {} seats to available", affected);
        Ok(affected)
    }
}
