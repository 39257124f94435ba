//! Repository for the `whitelisted_emails` table.

use sqlx::PgPool;

use crate::models::whitelisted_email::WhitelistedEmail;

const COLUMNS: &str = "id, email, user_type, registration_code, created_at, updated_at";

pub struct WhitelistedEmailRepo;

impl WhitelistedEmailRepo {
    /// Allow `email` to register as `user_type` with `registration_code`.
    ///
    /// An existing entry for the same email gets its role and code replaced.
    pub async fn upsert(
        pool: &PgPool,
        email: &str,
        user_type: &str,
        registration_code: &str,
    ) -> Result<WhitelistedEmail, sqlx::Error> {
        let query = format!(
            "INSERT INTO whitelisted_emails (email, user_type, registration_code)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_whitelisted_emails_email DO UPDATE SET
                user_type = EXCLUDED.user_type,
                registration_code = EXCLUDED.registration_code,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WhitelistedEmail>(&query)
            .bind(email)
            .bind(user_type)
            .bind(registration_code)
            .fetch_one(pool)
            .await
    }

    /// Find the entry for an email (case-sensitive).
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<WhitelistedEmail>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM whitelisted_emails WHERE email = $1");
        sqlx::query_as::<_, WhitelistedEmail>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }
}
