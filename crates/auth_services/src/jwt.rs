use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::types::{AuthContext, AuthError, Claims, Role, User};

const DEFAULT_EXPIRY_DAYS: i64 = 7;

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_days: i64,
}

impl JwtService {
    /// Creates a service from `JWT_SECRET` and `JWT_EXPIRY_DAYS` environment
    /// variables, with development defaults.
    pub fn new() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-this-in-production".to_string());

        let expiry_days = std::env::var("JWT_EXPIRY_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EXPIRY_DAYS);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            expiry_days,
        }
    }

    /// Signs a token for the given user, valid for the configured expiry.
    pub fn generate_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = (now + Duration::days(self.expiry_days)).timestamp() as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            exp: expiration,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies a token's signature and expiry, returning its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }

    /// Resolves a token to the identity it carries.
    pub fn resolve(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = self.verify_token(token)?;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| {
            AuthError::Jwt(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ))
        })?;
        let role = Role::parse(&claims.role).ok_or_else(|| {
            AuthError::Jwt(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ))
        })?;

        Ok(AuthContext { id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "host@example.com".to_string(),
            phone_number: None,
            password_hash: "irrelevant".to_string(),
            name: "Sample Host".to_string(),
            role: Role::Host,
            is_verified: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_identity_and_role() {
        let service = JwtService::new();
        let user = sample_user();

        let token = service.generate_token(&user).unwrap();
        let ctx = service.resolve(&token).unwrap();

        assert_eq!(ctx.id, user.id);
        assert_eq!(ctx.role, Role::Host);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = JwtService::new();
        let user = sample_user();

        let mut token = service.generate_token(&user).unwrap();
        token.push('x');

        assert!(service.resolve(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = JwtService::new();
        assert!(service.resolve("not-a-jwt").is_err());
    }
}
