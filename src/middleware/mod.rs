//! Request authentication, authorization, and extraction.

pub mod auth;
pub mod extract;
pub mod rbac;
