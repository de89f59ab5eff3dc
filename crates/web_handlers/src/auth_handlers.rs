use actix_web::{HttpResponse, Result, web};
use sqlx::PgPool;
use validator::Validate;

use auth_services::jwt::JwtService;
use auth_services::service::AuthService;
use auth_services::types::*;

/// Handles user registration: validates the request, creates the user with a
/// hashed password, and returns the user info with a signed bearer token.
pub async fn register(
    pool: web::Data<PgPool>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AuthError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| AuthError::Validation(format!("Validation error: {}", e)))?;

    let auth_service = AuthService::new(pool.get_ref().clone());
    let jwt_service = JwtService::new();

    // Create the user
    let user = auth_service.create_user(&request).await?;

    // Issue the bearer token
    let token = jwt_service.generate_token(&user)?;

    let response = AuthResponse {
        token,
        user: UserInfo::from(&user),
    };

    Ok(HttpResponse::Created().json(response))
}

/// Handles user login: validates the request, verifies credentials against
/// the stored hash, and returns the user info with a signed bearer token.
pub async fn login(
    pool: web::Data<PgPool>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| AuthError::Validation(format!("Validation error: {}", e)))?;

    let auth_service = AuthService::new(pool.get_ref().clone());
    let jwt_service = JwtService::new();

    // Verify credentials
    let user = auth_service
        .verify_password(&request.email, &request.password)
        .await?;

    let token = jwt_service.generate_token(&user)?;

    let response = AuthResponse {
        token,
        user: UserInfo::from(&user),
    };

    Ok(HttpResponse::Ok().json(response))
}
