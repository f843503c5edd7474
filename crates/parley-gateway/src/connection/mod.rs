//! Live connection handles

mod connection;

pub use connection::{Connection, Delivery, Outbound};
