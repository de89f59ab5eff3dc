use bcrypt::{DEFAULT_COST, hash, verify};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::types::{AuthError, RegisterRequest, Role, UpdateProfileRequest, User};

const USER_COLUMNS: &str = r#"
    id, email, phone_number, password_hash, name, role,
    is_verified, is_active, created_at, updated_at
"#;

/// A service for handling user account operations: creating users,
/// retrieving user information, verifying credentials, and updating profiles.
pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    /// Creates a new instance of `AuthService` with the provided database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new user from a registration request.
    ///
    /// Emails are stored lowercased and must be unique. Only the `guest` and
    /// `host` roles are assignable at registration.
    pub async fn create_user(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        let role = match Role::parse(&request.role) {
            Some(Role::Guest) => Role::Guest,
            Some(Role::Host) => Role::Host,
            _ => return Err(AuthError::InvalidRole),
        };

        let email = normalize_email(&request.email);

        // Check if email already exists
        let existing_user = sqlx::query("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        if existing_user.is_some() {
            return Err(AuthError::EmailExists);
        }

        // Hash the password
        let password_hash = hash(&request.password, DEFAULT_COST)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, phone_number, password_hash, name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&email)
        .bind(request.phone_number.as_deref())
        .bind(&password_hash)
        .bind(request.name.trim())
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            // The unique index catches a concurrent duplicate that slipped
            // past the pre-check.
            if is_unique_violation(&err) {
                AuthError::EmailExists
            } else {
                AuthError::Database(err)
            }
        })?;

        map_user(&row)
    }

    /// Retrieves a user by their email address, returning `None` if not found or inactive.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND is_active = true"
        ))
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_user(&row)).transpose()
    }

    /// Retrieves a user by their ID, returning `None` if not found or inactive.
    pub async fn get_user_by_id(&self, user_id: &Uuid) -> Result<Option<User>, AuthError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_active = true"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_user(&row)).transpose()
    }

    /// Verifies the user's password against the stored bcrypt hash.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = verify(password, &user.password_hash)?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Updates the user's profile information. Absent fields keep their
    /// current values.
    pub async fn update_user_profile(
        &self,
        user_id: &Uuid,
        request: &UpdateProfileRequest,
    ) -> Result<User, AuthError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                phone_number = COALESCE($2, phone_number),
                updated_at = NOW()
            WHERE id = $3 AND is_active = true
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.name.as_deref().map(str::trim))
        .bind(request.phone_number.as_deref())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::UserNotFound)?;

        map_user(&row)
    }

    /// Activates or deactivates a user account. Deactivated users cannot
    /// authenticate but their records remain (accounts are never hard-deleted).
    pub async fn set_user_active(&self, user_id: &Uuid, is_active: bool) -> Result<(), AuthError> {
        let result = sqlx::query("UPDATE users SET is_active = $1, updated_at = NOW() WHERE id = $2")
            .bind(is_active)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn map_user(row: &PgRow) -> Result<User, AuthError> {
    let role: String = row.get("role");
    let role = Role::parse(&role)
        .ok_or_else(|| AuthError::Validation(format!("Unknown role in database: {}", role)))?;

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        phone_number: row.get("phone_number"),
        password_hash: row.get("password_hash"),
        name: row.get("name"),
        role,
        is_verified: row.get("is_verified"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_insert_share_one_email_normalization() {
        assert_eq!(normalize_email("  Guest@Example.COM "), "guest@example.com");
        assert_eq!(normalize_email("host@example.com"), "host@example.com");
    }
}
