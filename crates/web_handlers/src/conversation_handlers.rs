use actix_web::{HttpResponse, Result, web};
use sqlx::PgPool;
use validator::Validate;

use auth_services::middleware::AuthenticatedUser;
use booking_services::service::BookingService;
use booking_services::types::*;
use notification_services::NotificationService;

/// Lists the authenticated user's conversations, newest first.
pub async fn list_conversations(
    pool: web::Data<PgPool>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, BookingError> {
    let booking_service =
        BookingService::new(pool.get_ref().clone(), notifications.get_ref().clone());
    let conversations = booking_service.list_conversations(&user.0.id).await?;

    Ok(HttpResponse::Ok().json(conversations))
}

/// Returns a booking's conversation, creating it when missing. Parties and
/// admins only; idempotent per booking.
pub async fn create_conversation(
    pool: web::Data<PgPool>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    request: web::Json<CreateConversationRequest>,
) -> Result<HttpResponse, BookingError> {
    let booking_service =
        BookingService::new(pool.get_ref().clone(), notifications.get_ref().clone());
    let conversation = booking_service
        .ensure_conversation(&user.0.id, user.0.is_admin(), &request.booking_id)
        .await?;

    Ok(HttpResponse::Created().json(conversation))
}

/// Lists a conversation's messages in insertion order. Parties and admins only.
pub async fn list_messages(
    pool: web::Data<PgPool>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, BookingError> {
    let conversation_id = path.into_inner();
    let booking_service =
        BookingService::new(pool.get_ref().clone(), notifications.get_ref().clone());
    let messages = booking_service
        .list_messages(&user.0.id, user.0.is_admin(), &conversation_id)
        .await?;

    Ok(HttpResponse::Ok().json(messages))
}

/// Sends a message in a conversation the authenticated user is party to.
pub async fn send_message(
    pool: web::Data<PgPool>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
    request: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, BookingError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| BookingError::Validation(format!("Validation error: {}", e)))?;

    let conversation_id = path.into_inner();
    let booking_service =
        BookingService::new(pool.get_ref().clone(), notifications.get_ref().clone());
    let message = booking_service
        .send_message(&user.0.id, &conversation_id, &request.content)
        .await?;

    Ok(HttpResponse::Created().json(message))
}

/// Marks a message as read. Only the counterparty may do so.
pub async fn mark_message_read(
    pool: web::Data<PgPool>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, BookingError> {
    let message_id = path.into_inner();
    let booking_service =
        BookingService::new(pool.get_ref().clone(), notifications.get_ref().clone());
    let message = booking_service
        .mark_message_read(&user.0.id, user.0.is_admin(), &message_id)
        .await?;

    Ok(HttpResponse::Ok().json(message))
}
