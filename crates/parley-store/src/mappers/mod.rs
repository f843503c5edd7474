//! Entity to model mappers
//!
//! - `From<Model> for Entity`: convert database rows to domain objects
//! - `*Insert` structs: borrow entity data for binding into INSERT statements

mod message;
mod user;

pub use message::MessageInsert;
pub use user::UserInsert;
