//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the table plus the
//! `Deserialize` DTOs used for inserts and patches. Request bodies use
//! camelCase keys.

pub mod calendar_event;
pub mod representation;
pub mod representation_event;
pub mod todo;
pub mod user;
pub mod whitelisted_email;
