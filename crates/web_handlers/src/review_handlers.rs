use actix_web::{HttpResponse, Result, web};
use sqlx::PgPool;
use validator::Validate;

use auth_services::middleware::AuthenticatedUser;
use booking_services::service::BookingService;
use booking_services::types::*;
use notification_services::NotificationService;

/// Creates the review for a completed booking. Only the booking's guest may
/// write it, and only once.
pub async fn create_review(
    pool: web::Data<PgPool>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
    request: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, BookingError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| BookingError::Validation(format!("Validation error: {}", e)))?;

    let booking_id = path.into_inner();
    let booking_service =
        BookingService::new(pool.get_ref().clone(), notifications.get_ref().clone());
    let review = booking_service
        .create_review(&user.0.id, &booking_id, &request)
        .await?;

    Ok(HttpResponse::Created().json(review))
}

/// Lists a property's reviews, newest first. Public.
pub async fn list_property_reviews(
    pool: web::Data<PgPool>,
    notifications: web::Data<NotificationService>,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, BookingError> {
    let property_id = path.into_inner();
    let booking_service =
        BookingService::new(pool.get_ref().clone(), notifications.get_ref().clone());
    let reviews = booking_service.list_property_reviews(&property_id).await?;

    Ok(HttpResponse::Ok().json(reviews))
}
