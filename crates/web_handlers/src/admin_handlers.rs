use actix_web::{Error, HttpResponse, Result, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use uuid::Uuid;
use validator::Validate;

use auth_services::middleware::AuthenticatedUser;
use auth_services::service::AuthService;
use auth_services::types::AuthError;
use listing_services::service::ListingService;

/// Request structure for recording a moderation action
#[derive(Debug, Deserialize, Validate)]
pub struct AdminActionRequest {
    /// One of `deactivate_user`, `activate_user`, `deactivate_property`
    #[validate(length(min = 1, message = "Action is required"))]
    pub action: String,

    /// Entity kind the action targets: `user` or `property`
    #[validate(length(min = 1, message = "Target type is required"))]
    pub target_type: String,

    /// Id of the targeted entity
    pub target_id: Uuid,

    /// Free-form justification kept in the audit trail
    #[serde(default)]
    pub reason: String,
}

/// One audit record of an admin's action on a target entity.
#[derive(Debug, Serialize)]
pub struct AdminAction {
    /// Unique identifier for the record
    pub id: Uuid,
    /// The acting admin
    pub admin_id: Uuid,
    /// The action performed
    pub action: String,
    /// Entity kind the action targeted
    pub target_type: String,
    /// Id of the targeted entity
    pub target_id: Uuid,
    /// Justification given by the admin
    pub reason: String,
    /// When the action was recorded
    pub created_at: DateTime<Utc>,
}

/// Applies a moderation action and records it in the append-only audit
/// trail. Admin only.
pub async fn record_admin_action(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    request: web::Json<AdminActionRequest>,
) -> Result<HttpResponse, Error> {
    if !user.0.is_admin() {
        return Err(AuthError::Forbidden.into());
    }
    request
        .validate()
        .map_err(|e| AuthError::Validation(format!("Validation error: {}", e)))?;

    // Apply the moderation effect before recording it
    match (request.action.as_str(), request.target_type.as_str()) {
        ("deactivate_user", "user") => {
            AuthService::new(pool.get_ref().clone())
                .set_user_active(&request.target_id, false)
                .await?;
        }
        ("activate_user", "user") => {
            AuthService::new(pool.get_ref().clone())
                .set_user_active(&request.target_id, true)
                .await?;
        }
        ("deactivate_property", "property") => {
            ListingService::new(pool.get_ref().clone())
                .deactivate_property(&user.0.id, true, &request.target_id)
                .await?;
        }
        _ => {
            return Err(AuthError::Validation(format!(
                "Unknown action {} on {}",
                request.action, request.target_type
            ))
            .into());
        }
    }

    let row = sqlx::query(
        r#"
        INSERT INTO admin_actions (admin_id, action, target_type, target_id, reason)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, admin_id, action, target_type, target_id, reason, created_at
        "#,
    )
    .bind(user.0.id)
    .bind(&request.action)
    .bind(&request.target_type)
    .bind(request.target_id)
    .bind(&request.reason)
    .fetch_one(pool.get_ref())
    .await
    .map_err(AuthError::from)?;

    let action = map_admin_action(&row);
    log::info!(
        "admin {} performed {} on {} {}",
        action.admin_id,
        action.action,
        action.target_type,
        action.target_id
    );

    Ok(HttpResponse::Created().json(action))
}

/// Lists the audit trail, newest first. Admin only.
pub async fn list_admin_actions(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, Error> {
    if !user.0.is_admin() {
        return Err(AuthError::Forbidden.into());
    }

    let rows = sqlx::query(
        r#"
        SELECT id, admin_id, action, target_type, target_id, reason, created_at
        FROM admin_actions
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(AuthError::from)?;

    let actions: Vec<AdminAction> = rows.iter().map(map_admin_action).collect();

    Ok(HttpResponse::Ok().json(actions))
}

fn map_admin_action(row: &sqlx::postgres::PgRow) -> AdminAction {
    AdminAction {
        id: row.get("id"),
        admin_id: row.get("admin_id"),
        action: row.get("action"),
        target_type: row.get("target_type"),
        target_id: row.get("target_id"),
        reason: row.get("reason"),
        created_at: row.get("created_at"),
    }
}
