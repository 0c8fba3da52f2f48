//! Data layer: cache backends, warehouse access, and shared record types

pub mod cache;
pub mod traits;
pub mod types;
pub mod warehouse;
