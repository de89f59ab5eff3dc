use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors raised by notification persistence and delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Notification not found
    #[error("Notification not found")]
    NotFound,

    /// The actor does not own the notification
    #[error("Forbidden")]
    Forbidden,
}

impl actix_web::ResponseError for NotificationError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            NotificationError::NotFound => HttpResponse::NotFound().json(envelope(
                "NOT_FOUND",
                "Notification not found",
            )),
            NotificationError::Forbidden => HttpResponse::Forbidden().json(envelope(
                "FORBIDDEN",
                "You are not allowed to access this notification",
            )),
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

/// Type tag for a notification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A guest requested a booking on the host's property.
    BookingRequest,
    /// The host confirmed the guest's booking.
    BookingConfirmed,
    /// The host declined the guest's booking.
    BookingDeclined,
    /// One party cancelled the booking.
    BookingCancelled,
    /// The stay finished; the guest may now leave a review.
    BookingCompleted,
    /// A new message arrived in one of the user's conversations.
    MessageReceived,
}

impl NotificationKind {
    /// Database representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::BookingRequest => "booking_request",
            NotificationKind::BookingConfirmed => "booking_confirmed",
            NotificationKind::BookingDeclined => "booking_declined",
            NotificationKind::BookingCancelled => "booking_cancelled",
            NotificationKind::BookingCompleted => "booking_completed",
            NotificationKind::MessageReceived => "message_received",
        }
    }
}

/// A persisted notification addressed to one user.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Unique identifier for the notification
    pub id: Uuid,
    /// User the notification is addressed to
    pub user_id: Uuid,
    /// Type tag, e.g. `booking_request`
    pub kind: String,
    /// Short title
    pub title: String,
    /// Human-readable message body
    pub message: String,
    /// Type of the related entity, if any (e.g. `booking`)
    pub related_type: Option<String>,
    /// Id of the related entity, if any
    pub related_id: Option<Uuid>,
    /// Whether the user has read the notification
    pub is_read: bool,
    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

/// Fields for a notification about to be persisted.
#[derive(Debug, Clone)]
pub struct NewNotification {
    /// Target user
    pub user_id: Uuid,
    /// Type tag
    pub kind: NotificationKind,
    /// Short title
    pub title: String,
    /// Message body
    pub message: String,
    /// Related entity type, if any
    pub related_type: Option<String>,
    /// Related entity id, if any
    pub related_id: Option<Uuid>,
}

/// Typed event pushed over a user's live-session channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum LiveEvent {
    /// A notification was created for the subscribed user.
    #[serde(rename = "notification/created")]
    NotificationCreated {
        /// The persisted notification
        notification: Notification,
    },
    /// A booking was created against the subscribed user's property.
    #[serde(rename = "booking/created")]
    BookingCreated {
        /// The new booking's id
        booking_id: Uuid,
        /// The booked property
        property_id: Uuid,
    },
    /// A booking the subscribed user is party to changed status.
    #[serde(rename = "booking/status_changed")]
    BookingStatusChanged {
        /// The booking's id
        booking_id: Uuid,
        /// The new status
        status: String,
    },
    /// A message arrived in a conversation the subscribed user is party to.
    #[serde(rename = "message/created")]
    MessageCreated {
        /// The conversation the message belongs to
        conversation_id: Uuid,
        /// The serialized message
        message: serde_json::Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_events_serialize_with_slash_tags() {
        let event = LiveEvent::BookingStatusChanged {
            booking_id: Uuid::new_v4(),
            status: "confirmed".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "booking/status_changed");
        assert_eq!(value["status"], "confirmed");
    }

    #[test]
    fn notification_kinds_map_to_stable_tags() {
        assert_eq!(NotificationKind::BookingRequest.as_str(), "booking_request");
        assert_eq!(
            NotificationKind::BookingCompleted.as_str(),
            "booking_completed"
        );
    }
}
