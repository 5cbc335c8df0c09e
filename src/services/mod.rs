pub mod allocation;
pub mod reservation;
