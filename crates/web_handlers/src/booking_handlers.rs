use actix_web::{HttpResponse, Result, web};
use sqlx::PgPool;
use validator::Validate;

use auth_services::middleware::AuthenticatedUser;
use auth_services::types::Role;
use booking_services::service::BookingService;
use booking_services::types::*;
use notification_services::NotificationService;

/// Creates a booking for the authenticated guest. The booking, its
/// conversation, and the host's notification are written atomically.
pub async fn create_booking(
    pool: web::Data<PgPool>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    request: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, BookingError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| BookingError::Validation(format!("Validation error: {}", e)))?;

    if user.0.role != Role::Guest {
        return Err(BookingError::Forbidden);
    }

    let booking_service =
        BookingService::new(pool.get_ref().clone(), notifications.get_ref().clone());
    let booking = booking_service.create_booking(&user.0.id, &request).await?;

    Ok(HttpResponse::Created().json(booking))
}

/// Lists the authenticated user's bookings, as guest or host.
pub async fn list_bookings(
    pool: web::Data<PgPool>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, BookingError> {
    let booking_service =
        BookingService::new(pool.get_ref().clone(), notifications.get_ref().clone());
    let bookings = booking_service.list_bookings_for_user(&user.0.id).await?;

    let response = ListBookingsResponse {
        total: bookings.len() as i64,
        bookings,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Fetches one booking. Parties and admins only.
pub async fn get_booking(
    pool: web::Data<PgPool>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, BookingError> {
    let booking_id = path.into_inner();
    let booking_service =
        BookingService::new(pool.get_ref().clone(), notifications.get_ref().clone());
    let booking = booking_service
        .get_booking(&user.0.id, user.0.is_admin(), &booking_id)
        .await?;

    Ok(HttpResponse::Ok().json(booking))
}

/// Applies a status transition to a booking. The state machine decides
/// which edges exist and which party may drive them.
pub async fn update_booking_status(
    pool: web::Data<PgPool>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
    request: web::Json<UpdateBookingStatusRequest>,
) -> Result<HttpResponse, BookingError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| BookingError::Validation(format!("Validation error: {}", e)))?;

    let booking_id = path.into_inner();
    let booking_service =
        BookingService::new(pool.get_ref().clone(), notifications.get_ref().clone());
    let booking = booking_service
        .update_booking_status(&user.0.id, user.0.is_admin(), &booking_id, &request.status)
        .await?;

    Ok(HttpResponse::Ok().json(booking))
}
