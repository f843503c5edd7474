//! Durable message store as seen by the real-time core

mod adapter;

pub use adapter::MessageStoreAdapter;
