use actix_web::{HttpResponse, Result, web};
use serde::Deserialize;

use auth_services::middleware::AuthenticatedUser;
use notification_services::NotificationService;
use notification_services::types::NotificationError;

/// Query parameters for listing notifications
#[derive(Debug, Deserialize)]
pub struct ListNotificationsParams {
    /// When true, only unread notifications are returned
    #[serde(default)]
    pub unread_only: bool,
}

/// Request structure for toggling a notification's read flag
#[derive(Debug, Deserialize)]
pub struct SetNotificationReadRequest {
    /// The new read flag
    pub is_read: bool,
}

/// Lists the authenticated user's notifications, newest first.
pub async fn list_notifications(
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    params: web::Query<ListNotificationsParams>,
) -> Result<HttpResponse, NotificationError> {
    let items = notifications
        .list_for_user(&user.0.id, params.unread_only)
        .await?;

    Ok(HttpResponse::Ok().json(items))
}

/// Toggles the read flag on one notification. Addressee only.
pub async fn set_notification_read(
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
    request: web::Json<SetNotificationReadRequest>,
) -> Result<HttpResponse, NotificationError> {
    let notification_id = path.into_inner();
    let notification = notifications
        .set_read(&user.0.id, &notification_id, request.is_read)
        .await?;

    Ok(HttpResponse::Ok().json(notification))
}

/// Marks all of the authenticated user's notifications as read.
pub async fn mark_all_notifications_read(
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, NotificationError> {
    let updated = notifications.mark_all_read(&user.0.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "updated": updated })))
}
