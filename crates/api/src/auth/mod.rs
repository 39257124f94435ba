//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT session-token generation and validation.
//! - [`identity_cache`] -- Bounded TTL cache of session identities.

pub mod identity_cache;
pub mod jwt;
pub mod password;
