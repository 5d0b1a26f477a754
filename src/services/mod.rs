//! Business logic services.

pub mod auth;
pub mod broadcast;
pub mod donation;
pub mod donor;
pub mod hospital;
pub mod stats;
pub mod user;
