use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of seats in the venue.
pub const TOTAL_SEATS: i32 = 80;
/// Seats per full row; the last row is partial.
pub const SEATS_PER_ROW: i32 = 7;
/// Rows needed to hold `TOTAL_SEATS`.
pub const ROW_COUNT: i32 = (TOTAL_SEATS + SEATS_PER_ROW - 1) / SEATS_PER_ROW;
/// Largest number of seats a single reservation may ask for.
pub const MAX_SEATS_PER_REQUEST: u32 = 7;

/// Row a seat belongs to: `ceil(seat_number / 7)`.
pub fn row_for(seat_number: i32) -> i32 {
    (seat_number + SEATS_PER_ROW - 1) / SEATS_PER_ROW
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Booked,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Booked => "booked",
        }
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown seat status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for SeatStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(SeatStatus::Available),
            "booked" => Ok(SeatStatus::Booked),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: i64,
    pub row: i32,
    pub seat_number: i32,
    pub status: SeatStatus,
    pub updated_at: NaiveDateTime,
}

impl Seat {
    pub fn is_available(&self) -> bool {
        self.status == SeatStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_follow_ceiling_division() {
        assert_eq!(row_for(1), 1);
        assert_eq!(row_for(7), 1);
        assert_eq!(row_for(8), 2);
        assert_eq!(row_for(77), 11);
        assert_eq!(row_for(78), 12);
        assert_eq!(row_for(80), 12);
        assert_eq!(ROW_COUNT, 12);
    }

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!("available".parse::<SeatStatus>(), Ok(SeatStatus::Available));
        assert_eq!("booked".parse::<SeatStatus>(), Ok(SeatStatus::Booked));
        assert!("RESERVED".parse::<SeatStatus>().is_err());
    }

    #[test]
    fn seat_serializes_with_camel_case_fields() {
        let seat = Seat {
            id: 9,
            row: 2,
            seat_number: 9,
            status: SeatStatus::Booked,
            updated_at: chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        };
        let json = serde_json::to_value(&seat).unwrap();
        assert_eq!(json["seatNumber"], 9);
        assert_eq!(json["row"], 2);
        assert_eq!(json["status"], "booked");
        assert!(json.get("updatedAt").is_some());
    }
}
