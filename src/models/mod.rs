pub mod seat;

pub use seat::{Seat, SeatStatus};
