use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Books properties and writes reviews.
    Guest,
    /// Owns properties and receives bookings against them.
    Host,
    /// Moderates content and may act on any resource.
    Admin,
}

impl Role {
    /// Parses a role from its database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "guest" => Some(Role::Guest),
            "host" => Some(Role::Host),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Database representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Host => "host",
            Role::Admin => "admin",
        }
    }
}

/// Request structure for user registration
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Name of the user
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Email address of the user
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// Phone number of the user (optional)
    #[validate(length(
        min = 7,
        max = 20,
        message = "Phone number must be between 7-20 digits"
    ))]
    pub phone_number: Option<String>,

    /// Password for the user account
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Role requested at registration: "guest" or "host"
    pub role: String,
}

/// Request structure for user login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address of the user
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// Password for the user account
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request structure for updating the caller's profile
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// Name of the user
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: Option<String>,

    /// Phone number of the user
    #[validate(length(
        min = 7,
        max = 20,
        message = "Phone number must be between 7-20 digits"
    ))]
    pub phone_number: Option<String>,
}

/// Response structure for register/login: the user plus a bearer token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed bearer token for subsequent requests
    pub token: String,
    /// User information
    pub user: UserInfo,
}

/// Information about the user, used in responses
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Name of the user
    pub name: String,
    /// Email address of the user
    pub email: String,
    /// Phone number of the user
    pub phone_number: Option<String>,
    /// Role of the user
    pub role: Role,
    /// Whether the user's identity is verified
    pub is_verified: bool,
    /// Time at which the user was created
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

/// User model representing the database schema
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Email address of the user
    pub email: String,
    /// Phone number of the user (nullable)
    pub phone_number: Option<String>,
    /// Hashed password of the user
    pub password_hash: String,
    /// Name of the user
    pub name: String,
    /// Role of the user
    pub role: Role,
    /// Whether the user's identity is verified
    pub is_verified: bool,
    /// Whether the user account is active
    pub is_active: bool,
    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject of the token, the user ID
    pub sub: String,
    /// Email address of the user
    pub email: String,
    /// Role of the user
    pub role: String,
    /// Expiration timestamp of the token
    pub exp: usize,
    /// Issued at timestamp of the token
    pub iat: usize,
}

/// Identity resolved from a bearer token, carried in request extensions.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    /// Authenticated user id
    pub id: Uuid,
    /// Role embedded in the token
    pub role: Role,
}

impl AuthContext {
    /// Whether the actor holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The email address already exists in the system
    #[error("Email already exists")]
    EmailExists,

    /// The provided credentials are invalid
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The requested role is not assignable at registration
    #[error("Invalid role")]
    InvalidRole,

    /// The user was not found in the system
    #[error("User not found")]
    UserNotFound,

    /// The actor is not allowed to perform this action
    #[error("Forbidden")]
    Forbidden,

    /// An internal server error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An error occurred while hashing the password
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// An error occurred while signing or verifying a token
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// An error occurred while validating input data
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Builds the client-facing error envelope.
pub fn error_envelope(error_code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error_code": error_code,
        "message": message,
        "timestamp": Utc::now(),
    })
}

impl actix_web::ResponseError for AuthError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            AuthError::EmailExists => HttpResponse::Conflict().json(error_envelope(
                "USER_ALREADY_EXISTS",
                "An account with this email already exists",
            )),
            AuthError::InvalidCredentials => HttpResponse::BadRequest().json(error_envelope(
                "INVALID_CREDENTIALS",
                "Invalid email or password",
            )),
            AuthError::InvalidRole => HttpResponse::BadRequest().json(error_envelope(
                "VALIDATION_ERROR",
                "Role must be guest or host",
            )),
            AuthError::UserNotFound => {
                HttpResponse::NotFound().json(error_envelope("NOT_FOUND", "User not found"))
            }
            AuthError::Forbidden => HttpResponse::Forbidden().json(error_envelope(
                "FORBIDDEN",
                "You are not allowed to perform this action",
            )),
            AuthError::Validation(msg) => {
                HttpResponse::BadRequest().json(error_envelope("VALIDATION_ERROR", msg))
            }
            _ => HttpResponse::InternalServerError().json(error_envelope(
                "INTERNAL_ERROR",
                "An internal error occurred",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_its_database_form() {
        for role in [Role::Guest, Role::Host, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn error_envelope_carries_required_fields() {
        let envelope = error_envelope("VALIDATION_ERROR", "bad input");
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error_code"], "VALIDATION_ERROR");
        assert_eq!(envelope["message"], "bad input");
        assert!(envelope["timestamp"].is_string());
    }
}
