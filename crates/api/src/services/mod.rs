//! Domain services composing repositories with the rules in `talent_core`.
//!
//! Services are zero-sized structs whose associated functions take
//! `&PgPool` and return [`AppResult`](crate::error::AppResult), so handlers
//! and tests call them the same way.

pub mod calendar;
pub mod invitation;
pub mod representation;

pub use calendar::CalendarService;
pub use invitation::InvitationService;
pub use representation::RepresentationService;
