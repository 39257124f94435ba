//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod calendar_event_repo;
pub mod representation_event_repo;
pub mod representation_repo;
pub mod todo_repo;
pub mod user_repo;
pub mod whitelisted_email_repo;

pub use calendar_event_repo::CalendarEventRepo;
pub use representation_event_repo::RepresentationEventRepo;
pub use representation_repo::RepresentationRepo;
pub use todo_repo::TodoRepo;
pub use user_repo::UserRepo;
pub use whitelisted_email_repo::WhitelistedEmailRepo;
