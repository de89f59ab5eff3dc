use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::state::BookingStatus;
use listing_services::ListingError;

/// Booking model representing the database schema
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    /// Unique identifier for the booking
    pub id: Uuid,
    /// The booked property
    pub property_id: Uuid,
    /// The guest who made the booking
    pub guest_id: Uuid,
    /// The host, denormalized from the property at creation time so later
    /// host reassignment does not retroactively change existing bookings
    pub host_id: Uuid,
    /// Check-in date
    pub check_in_date: NaiveDate,
    /// Check-out date
    pub check_out_date: NaiveDate,
    /// Number of guests staying
    pub guests: i32,
    /// Total price including the service fee
    pub total_price: BigDecimal,
    /// Service fee portion of the total
    pub service_fee: BigDecimal,
    /// Lifecycle status
    pub status: BookingStatus,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
    /// When the booking was last updated
    pub updated_at: DateTime<Utc>,
}

/// Conversation model: exactly one per booking, between its guest and host.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    /// Unique identifier for the conversation
    pub id: Uuid,
    /// The booking this conversation belongs to
    pub booking_id: Uuid,
    /// The booking's guest
    pub guest_id: Uuid,
    /// The booking's host
    pub host_id: Uuid,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
}

/// Message model: append-only, sender must be a party to the conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Unique identifier for the message
    pub id: Uuid,
    /// The conversation the message belongs to
    pub conversation_id: Uuid,
    /// The sending party
    pub sender_id: Uuid,
    /// Message content
    pub content: String,
    /// Whether the counterparty has read the message
    pub is_read: bool,
    /// When the message was sent
    pub created_at: DateTime<Utc>,
}

/// Review model: at most one per booking, written by its guest.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    /// Unique identifier for the review
    pub id: Uuid,
    /// The reviewed booking
    pub booking_id: Uuid,
    /// The reviewed property
    pub property_id: Uuid,
    /// The authoring guest
    pub guest_id: Uuid,
    /// Cleanliness rating, 1-5
    pub rating_cleanliness: i32,
    /// Accuracy rating, 1-5
    pub rating_accuracy: i32,
    /// Check-in rating, 1-5
    pub rating_check_in: i32,
    /// Communication rating, 1-5
    pub rating_communication: i32,
    /// Location rating, 1-5
    pub rating_location: i32,
    /// Value rating, 1-5
    pub rating_value: i32,
    /// Overall rating, 1-5
    pub rating_overall: i32,
    /// Free-form comment
    pub comment: String,
    /// When the review was written
    pub created_at: DateTime<Utc>,
}

/// Request structure for creating a booking
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    /// The property to book
    pub property_id: Uuid,
    /// Check-in date
    pub check_in_date: NaiveDate,
    /// Check-out date
    pub check_out_date: NaiveDate,
    /// Number of guests staying
    #[validate(range(min = 1, max = 64, message = "Guests must be between 1 and 64"))]
    pub guests: i32,
}

/// Request structure for a booking status transition
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookingStatusRequest {
    /// Target status
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// Request structure for creating a review
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    /// Cleanliness rating, 1-5
    #[validate(range(min = 1, max = 5, message = "Ratings must be between 1 and 5"))]
    pub rating_cleanliness: i32,
    /// Accuracy rating, 1-5
    #[validate(range(min = 1, max = 5, message = "Ratings must be between 1 and 5"))]
    pub rating_accuracy: i32,
    /// Check-in rating, 1-5
    #[validate(range(min = 1, max = 5, message = "Ratings must be between 1 and 5"))]
    pub rating_check_in: i32,
    /// Communication rating, 1-5
    #[validate(range(min = 1, max = 5, message = "Ratings must be between 1 and 5"))]
    pub rating_communication: i32,
    /// Location rating, 1-5
    #[validate(range(min = 1, max = 5, message = "Ratings must be between 1 and 5"))]
    pub rating_location: i32,
    /// Value rating, 1-5
    #[validate(range(min = 1, max = 5, message = "Ratings must be between 1 and 5"))]
    pub rating_value: i32,
    /// Overall rating, 1-5
    #[validate(range(min = 1, max = 5, message = "Ratings must be between 1 and 5"))]
    pub rating_overall: i32,
    /// Free-form comment
    #[serde(default)]
    pub comment: String,
}

/// Request structure for creating (or fetching) a booking's conversation
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    /// The booking the conversation belongs to
    pub booking_id: Uuid,
}

/// Request structure for sending a message
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    /// Message content
    #[validate(length(min = 1, max = 5000, message = "Message content is required"))]
    pub content: String,
}

/// Response structure for listing bookings
#[derive(Debug, Serialize)]
pub struct ListBookingsResponse {
    /// The caller's bookings, newest first
    pub bookings: Vec<Booking>,
    /// Total count
    pub total: i64,
}

/// Custom error type for booking operations
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Booking, conversation, or message not found
    #[error("Not found")]
    NotFound,

    /// Actor is not a party to the resource
    #[error("Forbidden")]
    Forbidden,

    /// Invalid date range
    #[error("Invalid date range: check-out date must be after check-in date")]
    InvalidDateRange,

    /// A date in the requested stay is blocked in the availability ledger
    #[error("Property is not available for the requested dates")]
    PropertyUnavailable,

    /// No edge exists between the current and requested status
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: &'static str,
        /// Requested status
        to: &'static str,
    },

    /// A review was attempted before the booking completed
    #[error("Booking is not completed")]
    BookingNotCompleted,

    /// A review already exists for the booking
    #[error("A review already exists for this booking")]
    ReviewAlreadyExists,

    /// Error from the listing layer (property lookup, availability)
    #[error(transparent)]
    Listing(#[from] ListingError),
}

impl actix_web::ResponseError for BookingError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            BookingError::Validation(msg) => {
                HttpResponse::BadRequest().json(envelope("VALIDATION_ERROR", msg))
            }
            BookingError::NotFound => {
                HttpResponse::NotFound().json(envelope("NOT_FOUND", "Resource not found"))
            }
            BookingError::Forbidden => HttpResponse::Forbidden().json(envelope(
                "FORBIDDEN",
                "You are not a party to this resource",
            )),
            BookingError::InvalidDateRange => HttpResponse::BadRequest().json(envelope(
                "VALIDATION_ERROR",
                "Check-out date must be after check-in date",
            )),
            BookingError::PropertyUnavailable => HttpResponse::BadRequest().json(envelope(
                "PROPERTY_UNAVAILABLE",
                "The property is not available for the requested dates",
            )),
            BookingError::InvalidTransition { from, to } => {
                HttpResponse::BadRequest().json(envelope(
                    "INVALID_STATUS_TRANSITION",
                    &format!("Cannot transition a {} booking to {}", from, to),
                ))
            }
            BookingError::BookingNotCompleted => HttpResponse::BadRequest().json(envelope(
                "BOOKING_NOT_COMPLETED",
                "Reviews can only be written after the stay is completed",
            )),
            BookingError::ReviewAlreadyExists => HttpResponse::BadRequest().json(envelope(
                "REVIEW_ALREADY_EXISTS",
                "A review already exists for this booking",
            )),
            BookingError::Listing(err) => err.error_response(),
            _ => HttpResponse::InternalServerError().json(envelope(
                "INTERNAL_ERROR",
                "An internal error occurred",
            )),
        }
    }
}

fn envelope(error_code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error_code": error_code,
        "message": message,
        "timestamp": Utc::now(),
    })
}
