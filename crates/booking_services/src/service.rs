use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::state::{BookingParty, BookingStatus, TransitionError, check_transition};
use crate::types::{
    Booking, BookingError, Conversation, CreateBookingRequest, CreateReviewRequest, Message,
    Review,
};
use listing_services::ListingService;
use notification_services::service::insert_notification;
use notification_services::types::{NewNotification, NotificationKind};
use notification_services::{LiveEvent, NotificationService};

/// Service fee charged on top of the nightly subtotal, in percent.
const SERVICE_FEE_PERCENT: i64 = 12;

const BOOKING_COLUMNS: &str = r#"
    id, property_id, guest_id, host_id, check_in_date, check_out_date,
    guests, total_price, service_fee, status, created_at, updated_at
"#;

/// Validates a stay's date range: check-out must fall after check-in.
pub fn check_stay_dates(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), BookingError> {
    if check_out <= check_in {
        return Err(BookingError::InvalidDateRange);
    }
    Ok(())
}

/// Decides whether the actor may write the booking's review: only the
/// booking's guest, only after the stay completed, and only once.
pub fn review_gate(
    booking: &Booking,
    actor_id: &Uuid,
    has_existing_review: bool,
) -> Result<(), BookingError> {
    if booking.guest_id != *actor_id {
        return Err(BookingError::Forbidden);
    }
    if booking.status != BookingStatus::Completed {
        return Err(BookingError::BookingNotCompleted);
    }
    if has_existing_review {
        return Err(BookingError::ReviewAlreadyExists);
    }
    Ok(())
}

/// Computes the service fee for a stay subtotal, rounded to cents.
pub fn service_fee(subtotal: &BigDecimal) -> BigDecimal {
    (subtotal * BigDecimal::from(SERVICE_FEE_PERCENT) / BigDecimal::from(100))
        .with_scale_round(2, RoundingMode::HalfUp)
}

/// The counterparty to notify for a status change, with the notification
/// kind to use. Cancellation notifies the other party relative to whoever
/// cancelled; every other transition notifies the guest.
pub fn transition_notification(
    booking: &Booking,
    new_status: BookingStatus,
    actor: BookingParty,
) -> Option<(Uuid, NotificationKind)> {
    match new_status {
        BookingStatus::Confirmed => Some((booking.guest_id, NotificationKind::BookingConfirmed)),
        BookingStatus::Declined => Some((booking.guest_id, NotificationKind::BookingDeclined)),
        BookingStatus::Completed => Some((booking.guest_id, NotificationKind::BookingCompleted)),
        BookingStatus::Cancelled => {
            let recipient = match actor {
                BookingParty::Guest => booking.host_id,
                _ => booking.guest_id,
            };
            Some((recipient, NotificationKind::BookingCancelled))
        }
        BookingStatus::Pending => None,
    }
}

/// Service for the booking lifecycle: creation, status transitions,
/// conversations, messages, and reviews.
pub struct BookingService {
    pool: PgPool,
    notifications: NotificationService,
}

impl BookingService {
    /// Creates a new instance of `BookingService` over the given pool and
    /// notification service.
    pub fn new(pool: PgPool, notifications: NotificationService) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Creates a booking for the guest.
    ///
    /// The booking row, its conversation, and the host's `booking_request`
    /// notification are written in one transaction, so a mid-sequence
    /// failure cannot leave a booking without its conversation. The live
    /// push to the host happens after commit.
    pub async fn create_booking(
        &self,
        guest_id: &Uuid,
        request: &CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        check_stay_dates(request.check_in_date, request.check_out_date)?;

        let listings = ListingService::new(self.pool.clone());
        let property = listings.get_property(&request.property_id).await?;

        if !property.is_active {
            return Err(BookingError::NotFound);
        }
        if property.host_id == *guest_id {
            return Err(BookingError::Validation(
                "You cannot book your own property".to_string(),
            ));
        }
        if request.guests > property.max_guests {
            return Err(BookingError::Validation(format!(
                "The property sleeps at most {} guests",
                property.max_guests
            )));
        }

        let available = listings
            .is_property_available(&property.id, request.check_in_date, request.check_out_date)
            .await?;
        if !available {
            return Err(BookingError::PropertyUnavailable);
        }

        let subtotal = listings
            .stay_subtotal(&property, request.check_in_date, request.check_out_date)
            .await?;
        let fee = service_fee(&subtotal);
        let total = (&subtotal + &fee).with_scale_round(2, RoundingMode::HalfUp);

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO bookings (
                property_id, guest_id, host_id, check_in_date, check_out_date,
                guests, total_price, service_fee
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(property.id)
        .bind(guest_id)
        .bind(property.host_id)
        .bind(request.check_in_date)
        .bind(request.check_out_date)
        .bind(request.guests)
        .bind(&total)
        .bind(&fee)
        .fetch_one(&mut *tx)
        .await?;

        let booking = map_booking(&row)?;

        sqlx::query(
            "INSERT INTO conversations (booking_id, guest_id, host_id) VALUES ($1, $2, $3)",
        )
        .bind(booking.id)
        .bind(booking.guest_id)
        .bind(booking.host_id)
        .execute(&mut *tx)
        .await?;

        let notification = insert_notification(
            &mut *tx,
            &NewNotification {
                user_id: booking.host_id,
                kind: NotificationKind::BookingRequest,
                title: "New booking request".to_string(),
                message: format!(
                    "{} requested {} to {} for {} guest(s)",
                    property.title, booking.check_in_date, booking.check_out_date, booking.guests
                ),
                related_type: Some("booking".to_string()),
                related_id: Some(booking.id),
            },
        )
        .await?;

        tx.commit().await?;

        self.notifications.push(&notification).await;
        self.notifications
            .publish(
                booking.host_id,
                LiveEvent::BookingCreated {
                    booking_id: booking.id,
                    property_id: booking.property_id,
                },
            )
            .await;

        log::info!(
            "booking {} created on property {} by guest {}",
            booking.id,
            booking.property_id,
            booking.guest_id
        );

        Ok(booking)
    }

    /// Fetches a booking. Only its parties and admins may see it.
    pub async fn get_booking(
        &self,
        actor_id: &Uuid,
        is_admin: bool,
        booking_id: &Uuid,
    ) -> Result<Booking, BookingError> {
        let booking = self.fetch_booking(booking_id).await?;
        self.party_of(&booking, actor_id, is_admin)?;
        Ok(booking)
    }

    /// Lists every booking the user is a party to, newest first.
    pub async fn list_bookings_for_user(&self, user_id: &Uuid) -> Result<Vec<Booking>, BookingError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE guest_id = $1 OR host_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_booking).collect()
    }

    /// Applies a status transition, enforcing the edge table and per-edge
    /// authority, then notifies the appropriate counterparty.
    pub async fn update_booking_status(
        &self,
        actor_id: &Uuid,
        is_admin: bool,
        booking_id: &Uuid,
        new_status: &str,
    ) -> Result<Booking, BookingError> {
        let new_status = BookingStatus::parse(new_status)
            .ok_or_else(|| BookingError::Validation(format!("Unknown status: {}", new_status)))?;

        let booking = self.fetch_booking(booking_id).await?;
        let party = self.party_of(&booking, actor_id, is_admin)?;

        check_transition(booking.status, new_status, party).map_err(|err| match err {
            TransitionError::Undefined => BookingError::InvalidTransition {
                from: booking.status.as_str(),
                to: new_status.as_str(),
            },
            TransitionError::Unauthorized => BookingError::Forbidden,
        })?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(new_status.as_str())
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await?;

        let updated = map_booking(&row)?;

        if let Some((recipient, kind)) = transition_notification(&updated, new_status, party) {
            let notification = self
                .notifications
                .create_and_deliver(NewNotification {
                    user_id: recipient,
                    kind,
                    title: format!("Booking {}", new_status.as_str()),
                    message: format!(
                        "Your booking from {} to {} is now {}",
                        updated.check_in_date,
                        updated.check_out_date,
                        new_status.as_str()
                    ),
                    related_type: Some("booking".to_string()),
                    related_id: Some(updated.id),
                })
                .await;

            if let Err(err) = notification {
                // The transition itself committed; a failed notification
                // write must not roll it back.
                log::warn!("failed to notify user {} of booking {}: {}", recipient, updated.id, err);
            }

            self.notifications
                .publish(
                    recipient,
                    LiveEvent::BookingStatusChanged {
                        booking_id: updated.id,
                        status: new_status.as_str().to_string(),
                    },
                )
                .await;
        }

        Ok(updated)
    }

    /// Returns the booking's conversation, creating it if the booking
    /// predates automatic conversation creation. Idempotent per booking.
    pub async fn ensure_conversation(
        &self,
        actor_id: &Uuid,
        is_admin: bool,
        booking_id: &Uuid,
    ) -> Result<Conversation, BookingError> {
        let booking = self.fetch_booking(booking_id).await?;
        self.party_of(&booking, actor_id, is_admin)?;

        sqlx::query(
            r#"
            INSERT INTO conversations (booking_id, guest_id, host_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (booking_id) DO NOTHING
            "#,
        )
        .bind(booking.id)
        .bind(booking.guest_id)
        .bind(booking.host_id)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT id, booking_id, guest_id, host_id, created_at FROM conversations WHERE booking_id = $1",
        )
        .bind(booking.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_conversation(&row))
    }

    /// Lists every conversation the user is a party to, newest first.
    pub async fn list_conversations(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<Conversation>, BookingError> {
        let rows = sqlx::query(
            r#"
            SELECT id, booking_id, guest_id, host_id, created_at
            FROM conversations
            WHERE guest_id = $1 OR host_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_conversation).collect())
    }

    /// Lists a conversation's messages in insertion order. Parties and
    /// admins only.
    pub async fn list_messages(
        &self,
        actor_id: &Uuid,
        is_admin: bool,
        conversation_id: &Uuid,
    ) -> Result<Vec<Message>, BookingError> {
        let conversation = self.fetch_conversation(conversation_id).await?;
        require_conversation_party(&conversation, actor_id, is_admin)?;

        let rows = sqlx::query(
            r#"
            SELECT id, conversation_id, sender_id, content, is_read, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_message).collect())
    }

    /// Appends a message to the conversation. The sender must be the
    /// conversation's guest or host; the counterparty is notified and
    /// receives a live `message/created` event.
    pub async fn send_message(
        &self,
        sender_id: &Uuid,
        conversation_id: &Uuid,
        content: &str,
    ) -> Result<Message, BookingError> {
        let conversation = self.fetch_conversation(conversation_id).await?;
        if *sender_id != conversation.guest_id && *sender_id != conversation.host_id {
            return Err(BookingError::Forbidden);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO messages (conversation_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, conversation_id, sender_id, content, is_read, created_at
            "#,
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        let message = map_message(&row);

        let recipient = if *sender_id == conversation.guest_id {
            conversation.host_id
        } else {
            conversation.guest_id
        };

        if let Err(err) = self
            .notifications
            .create_and_deliver(NewNotification {
                user_id: recipient,
                kind: NotificationKind::MessageReceived,
                title: "New message".to_string(),
                message: preview(content),
                related_type: Some("conversation".to_string()),
                related_id: Some(conversation.id),
            })
            .await
        {
            log::warn!("failed to notify user {} of message {}: {}", recipient, message.id, err);
        }

        self.notifications
            .publish(
                recipient,
                LiveEvent::MessageCreated {
                    conversation_id: conversation.id,
                    message: serde_json::to_value(&message).unwrap_or_default(),
                },
            )
            .await;

        Ok(message)
    }

    /// Marks a message read. Only the counterparty may do so.
    pub async fn mark_message_read(
        &self,
        actor_id: &Uuid,
        is_admin: bool,
        message_id: &Uuid,
    ) -> Result<Message, BookingError> {
        let row = sqlx::query(
            r#"
            SELECT m.id, m.conversation_id, m.sender_id, m.content, m.is_read, m.created_at,
                   c.guest_id, c.host_id
            FROM messages m
            JOIN conversations c ON m.conversation_id = c.id
            WHERE m.id = $1
            "#,
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BookingError::NotFound)?;

        let guest_id: Uuid = row.get("guest_id");
        let host_id: Uuid = row.get("host_id");
        let sender_id: Uuid = row.get("sender_id");

        let is_party = *actor_id == guest_id || *actor_id == host_id;
        if !is_party && !is_admin {
            return Err(BookingError::Forbidden);
        }
        if *actor_id == sender_id {
            return Err(BookingError::Validation(
                "The sender cannot mark their own message as read".to_string(),
            ));
        }

        let row = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = true
            WHERE id = $1
            RETURNING id, conversation_id, sender_id, content, is_read, created_at
            "#,
        )
        .bind(message_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_message(&row))
    }

    /// Creates the booking's review. Only the booking's guest may write it,
    /// only once, and only after the booking completed.
    pub async fn create_review(
        &self,
        actor_id: &Uuid,
        booking_id: &Uuid,
        request: &CreateReviewRequest,
    ) -> Result<Review, BookingError> {
        let booking = self.fetch_booking(booking_id).await?;

        let existing = sqlx::query("SELECT id FROM reviews WHERE booking_id = $1")
            .bind(booking_id)
            .fetch_optional(&self.pool)
            .await?;
        review_gate(&booking, actor_id, existing.is_some())?;

        let row = sqlx::query(
            r#"
            INSERT INTO reviews (
                booking_id, property_id, guest_id,
                rating_cleanliness, rating_accuracy, rating_check_in,
                rating_communication, rating_location, rating_value,
                rating_overall, comment
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, booking_id, property_id, guest_id,
                      rating_cleanliness, rating_accuracy, rating_check_in,
                      rating_communication, rating_location, rating_value,
                      rating_overall, comment, created_at
            "#,
        )
        .bind(booking.id)
        .bind(booking.property_id)
        .bind(booking.guest_id)
        .bind(request.rating_cleanliness)
        .bind(request.rating_accuracy)
        .bind(request.rating_check_in)
        .bind(request.rating_communication)
        .bind(request.rating_location)
        .bind(request.rating_value)
        .bind(request.rating_overall)
        .bind(&request.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            // The unique index is the last line of defense against a
            // concurrent duplicate slipping past the pre-check.
            if is_unique_violation(&err) {
                BookingError::ReviewAlreadyExists
            } else {
                BookingError::Database(err)
            }
        })?;

        Ok(map_review(&row))
    }

    /// Lists a property's reviews, newest first.
    pub async fn list_property_reviews(
        &self,
        property_id: &Uuid,
    ) -> Result<Vec<Review>, BookingError> {
        let rows = sqlx::query(
            r#"
            SELECT id, booking_id, property_id, guest_id,
                   rating_cleanliness, rating_accuracy, rating_check_in,
                   rating_communication, rating_location, rating_value,
                   rating_overall, comment, created_at
            FROM reviews
            WHERE property_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_review).collect())
    }

    async fn fetch_booking(&self, booking_id: &Uuid) -> Result<Booking, BookingError> {
        let row = sqlx::query(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BookingError::NotFound)?;

        map_booking(&row)
    }

    async fn fetch_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Conversation, BookingError> {
        let row = sqlx::query(
            "SELECT id, booking_id, guest_id, host_id, created_at FROM conversations WHERE id = $1",
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BookingError::NotFound)?;

        Ok(map_conversation(&row))
    }

    fn party_of(
        &self,
        booking: &Booking,
        actor_id: &Uuid,
        is_admin: bool,
    ) -> Result<BookingParty, BookingError> {
        if is_admin {
            Ok(BookingParty::Admin)
        } else if *actor_id == booking.guest_id {
            Ok(BookingParty::Guest)
        } else if *actor_id == booking.host_id {
            Ok(BookingParty::Host)
        } else {
            Err(BookingError::Forbidden)
        }
    }
}

fn require_conversation_party(
    conversation: &Conversation,
    actor_id: &Uuid,
    is_admin: bool,
) -> Result<(), BookingError> {
    if *actor_id == conversation.guest_id || *actor_id == conversation.host_id || is_admin {
        Ok(())
    } else {
        Err(BookingError::Forbidden)
    }
}

fn preview(content: &str) -> String {
    const PREVIEW_LEN: usize = 120;
    if content.chars().count() <= PREVIEW_LEN {
        content.to_string()
    } else {
        let truncated: String = content.chars().take(PREVIEW_LEN).collect();
        format!("{}…", truncated)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn map_booking(row: &PgRow) -> Result<Booking, BookingError> {
    let status: String = row.get("status");
    let status = BookingStatus::parse(&status)
        .ok_or_else(|| BookingError::Validation(format!("Unknown status in database: {}", status)))?;

    Ok(Booking {
        id: row.get("id"),
        property_id: row.get("property_id"),
        guest_id: row.get("guest_id"),
        host_id: row.get("host_id"),
        check_in_date: row.get("check_in_date"),
        check_out_date: row.get("check_out_date"),
        guests: row.get("guests"),
        total_price: row.get("total_price"),
        service_fee: row.get("service_fee"),
        status,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_conversation(row: &PgRow) -> Conversation {
    Conversation {
        id: row.get("id"),
        booking_id: row.get("booking_id"),
        guest_id: row.get("guest_id"),
        host_id: row.get("host_id"),
        created_at: row.get("created_at"),
    }
}

fn map_message(row: &PgRow) -> Message {
    Message {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        sender_id: row.get("sender_id"),
        content: row.get("content"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    }
}

fn map_review(row: &PgRow) -> Review {
    Review {
        id: row.get("id"),
        booking_id: row.get("booking_id"),
        property_id: row.get("property_id"),
        guest_id: row.get("guest_id"),
        rating_cleanliness: row.get("rating_cleanliness"),
        rating_accuracy: row.get("rating_accuracy"),
        rating_check_in: row.get("rating_check_in"),
        rating_communication: row.get("rating_communication"),
        rating_location: row.get("rating_location"),
        rating_value: row.get("rating_value"),
        rating_overall: row.get("rating_overall"),
        comment: row.get("comment"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;

    fn sample_booking(guest: Uuid, host: Uuid, status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            guest_id: guest,
            host_id: host,
            check_in_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            guests: 2,
            total_price: BigDecimal::from(336),
            service_fee: BigDecimal::from(36),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn service_fee_is_twelve_percent_rounded_to_cents() {
        let subtotal = BigDecimal::from_str("300.00").unwrap();
        assert_eq!(service_fee(&subtotal), BigDecimal::from_str("36.00").unwrap());

        let odd = BigDecimal::from_str("99.99").unwrap();
        assert_eq!(service_fee(&odd), BigDecimal::from_str("12.00").unwrap());
    }

    #[test]
    fn confirmation_and_decline_notify_the_guest() {
        let guest = Uuid::new_v4();
        let host = Uuid::new_v4();
        let booking = sample_booking(guest, host, BookingStatus::Pending);

        let (recipient, kind) =
            transition_notification(&booking, BookingStatus::Confirmed, BookingParty::Host)
                .unwrap();
        assert_eq!(recipient, guest);
        assert_eq!(kind, NotificationKind::BookingConfirmed);

        let (recipient, kind) =
            transition_notification(&booking, BookingStatus::Declined, BookingParty::Host).unwrap();
        assert_eq!(recipient, guest);
        assert_eq!(kind, NotificationKind::BookingDeclined);
    }

    #[test]
    fn cancellation_notifies_the_other_party() {
        let guest = Uuid::new_v4();
        let host = Uuid::new_v4();
        let booking = sample_booking(guest, host, BookingStatus::Confirmed);

        let (recipient, _) =
            transition_notification(&booking, BookingStatus::Cancelled, BookingParty::Guest)
                .unwrap();
        assert_eq!(recipient, host);

        let (recipient, _) =
            transition_notification(&booking, BookingStatus::Cancelled, BookingParty::Host)
                .unwrap();
        assert_eq!(recipient, guest);

        // An admin cancelling acts on the host's side of the ledger.
        let (recipient, _) =
            transition_notification(&booking, BookingStatus::Cancelled, BookingParty::Admin)
                .unwrap();
        assert_eq!(recipient, guest);
    }

    #[test]
    fn completion_notifies_the_guest() {
        let guest = Uuid::new_v4();
        let booking = sample_booking(guest, Uuid::new_v4(), BookingStatus::Confirmed);

        let (recipient, kind) =
            transition_notification(&booking, BookingStatus::Completed, BookingParty::Host)
                .unwrap();
        assert_eq!(recipient, guest);
        assert_eq!(kind, NotificationKind::BookingCompleted);
    }

    #[test]
    fn stays_must_check_out_after_check_in() {
        let check_in = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();

        assert!(check_stay_dates(check_in, check_in.succ_opt().unwrap()).is_ok());
        assert!(matches!(
            check_stay_dates(check_in, check_in),
            Err(BookingError::InvalidDateRange)
        ));
        assert!(matches!(
            check_stay_dates(check_in, check_in.pred_opt().unwrap()),
            Err(BookingError::InvalidDateRange)
        ));
    }

    #[test]
    fn reviews_require_a_completed_booking() {
        let guest = Uuid::new_v4();
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Declined,
            BookingStatus::Cancelled,
        ] {
            let booking = sample_booking(guest, Uuid::new_v4(), status);
            assert!(matches!(
                review_gate(&booking, &guest, false),
                Err(BookingError::BookingNotCompleted)
            ));
        }

        let completed = sample_booking(guest, Uuid::new_v4(), BookingStatus::Completed);
        assert!(review_gate(&completed, &guest, false).is_ok());
    }

    #[test]
    fn only_the_booking_guest_may_review() {
        let guest = Uuid::new_v4();
        let host = Uuid::new_v4();
        let booking = sample_booking(guest, host, BookingStatus::Completed);

        assert!(matches!(
            review_gate(&booking, &host, false),
            Err(BookingError::Forbidden)
        ));
        assert!(matches!(
            review_gate(&booking, &Uuid::new_v4(), false),
            Err(BookingError::Forbidden)
        ));
    }

    #[test]
    fn second_review_on_a_booking_is_rejected() {
        let guest = Uuid::new_v4();
        let booking = sample_booking(guest, Uuid::new_v4(), BookingStatus::Completed);

        assert!(matches!(
            review_gate(&booking, &guest, true),
            Err(BookingError::ReviewAlreadyExists)
        ));
    }

    #[test]
    fn long_message_previews_are_truncated() {
        let short = "see you at check-in";
        assert_eq!(preview(short), short);

        let long = "a".repeat(500);
        let p = preview(&long);
        assert_eq!(p.chars().count(), 121);
        assert!(p.ends_with('…'));
    }
}
