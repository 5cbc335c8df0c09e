//! Seat selection for a reservation request.
//!
//! Selection prefers keeping a party together in one row: the lowest row
//! that still has enough free seats wins. When no row can hold the whole
//! party, the request is filled from the front of the venue across rows.

use crate::models::seat::{Seat, MAX_SEATS_PER_REQUEST, ROW_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("requested seat count must be between 1 and {MAX_SEATS_PER_REQUEST}")]
    InvalidRequest,
    #[error("not enough seats available")]
    InsufficientSeats,
}

pub fn validate_count(count: u32) -> Result<(), AllocationError> {
    if (1..=MAX_SEATS_PER_REQUEST).contains(&count) {
        Ok(())
    } else {
        Err(AllocationError::InvalidRequest)
    }
}

/// Pick `count` seats out of `available`.
///
/// `available` must be ordered by `(row, seat_number)`, which is what
/// [`SeatStore::list_available`](crate::store::SeatStore::list_available)
/// returns. Nothing is persisted here.
pub fn allocate(available: &[Seat], count: u32) -> Result<Vec<Seat>, AllocationError> {
    validate_count(count)?;
    let count = count as usize;
    if available.len() < count {
        return Err(AllocationError::InsufficientSeats);
    }

    for row in 1..=ROW_COUNT {
        let row_seats: Vec<&Seat> = available.iter().filter(|s| s.row == row).collect();
        if row_seats.len() >= count {
            return Ok(row_seats.into_iter().take(count).cloned().collect());
        }
    }

    Ok(available[..count].to_vec())
}
