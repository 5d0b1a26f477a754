//! Database models and DTOs for all domain entities.

pub mod donation;
pub mod donor;
pub mod hospital;
pub mod stats;
pub mod user;
