//! API route handlers

pub mod activity;
pub mod health;
pub mod metrics;
pub mod sessions;
pub mod summary;
