//! Well-known role name constants.
//!
//! These must match the `chk_users_role` constraint in the users migration.

pub const ROLE_AGENT: &str = "agent";
pub const ROLE_CLIENT: &str = "client";

/// Every role a user row may carry.
pub const VALID_ROLES: &[&str] = &[ROLE_AGENT, ROLE_CLIENT];

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}
