//! Helpers for onboarding a client under an agent.

use crate::representation::RepresentationTerms;

/// Terms given to every representation created by an invitation.
pub fn default_terms() -> RepresentationTerms {
    RepresentationTerms {
        commission: 10.0,
        exclusivity: false,
        territories: vec!["US".to_string()],
        media_types: vec!["Theatrical".to_string()],
    }
}

/// Split a display name into first and last name.
///
/// The first whitespace-delimited token is the first name and the trimmed
/// remainder (possibly empty) is the last name.
pub fn split_display_name(display_name: &str) -> (String, String) {
    let trimmed = display_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

/// A fresh opaque one-time registration code.
pub fn new_registration_code() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Self-registration link for a newly provisioned client.
pub fn build_magic_link(client_url: &str, email: &str, code: &str) -> String {
    format!(
        "{}/register?email={}&code={}",
        client_url.trim_end_matches('/'),
        urlencoding::encode(email),
        urlencoding::encode(code)
    )
}
