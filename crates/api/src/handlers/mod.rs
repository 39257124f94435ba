pub mod agent;
pub mod auth;
pub mod calendar;
pub mod client;
pub mod invites;
pub mod roster;
pub mod todos;
