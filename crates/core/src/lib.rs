//! Domain logic for the talent agency platform.
//!
//! This crate has no I/O and no internal dependencies so it can be shared by
//! the repository layer, the HTTP server, and any future tooling.

pub mod calendar;
pub mod error;
pub mod invitation;
pub mod representation;
pub mod roles;
pub mod time;
pub mod todo;
pub mod types;
