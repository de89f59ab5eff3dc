use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::dispatcher::Dispatcher;
use crate::types::{LiveEvent, NewNotification, Notification, NotificationError};

/// Inserts a notification row on any executor, so callers can write it
/// inside their own transaction alongside the state change that caused it.
pub async fn insert_notification<'e, E>(
    executor: E,
    new: &NewNotification,
) -> Result<Notification, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let row = sqlx::query(
        r#"
        INSERT INTO notifications (user_id, kind, title, message, related_type, related_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, kind, title, message, related_type, related_id, is_read, created_at
        "#,
    )
    .bind(new.user_id)
    .bind(new.kind.as_str())
    .bind(&new.title)
    .bind(&new.message)
    .bind(new.related_type.as_deref())
    .bind(new.related_id)
    .fetch_one(executor)
    .await?;

    Ok(map_notification(&row))
}

/// Service for persisting notifications and delivering them to live sessions.
#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
    dispatcher: Dispatcher,
}

impl NotificationService {
    /// Creates a new service over the given pool and live-session registry.
    pub fn new(pool: PgPool, dispatcher: Dispatcher) -> Self {
        Self { pool, dispatcher }
    }

    /// The live-session registry, for WebSocket session setup.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Persists a notification and pushes it to the target user's live
    /// sessions. The row is the durable record; the push is best-effort.
    pub async fn create_and_deliver(
        &self,
        new: NewNotification,
    ) -> Result<Notification, NotificationError> {
        let notification = insert_notification(&self.pool, &new).await?;
        self.push(&notification).await;
        Ok(notification)
    }

    /// Pushes an already-persisted notification to its user's live sessions.
    /// Used when the row was inserted inside a caller's transaction.
    pub async fn push(&self, notification: &Notification) {
        self.dispatcher
            .publish(
                notification.user_id,
                LiveEvent::NotificationCreated {
                    notification: notification.clone(),
                },
            )
            .await;
    }

    /// Publishes an arbitrary live event to one user's sessions.
    pub async fn publish(&self, user_id: Uuid, event: LiveEvent) {
        self.dispatcher.publish(user_id, event).await;
    }

    /// Lists a user's notifications, newest first, optionally unread only.
    pub async fn list_for_user(
        &self,
        user_id: &Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, kind, title, message, related_type, related_id, is_read, created_at
            FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR is_read = false)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_notification).collect())
    }

    /// Sets the read flag on one notification. Only the addressee may do so.
    pub async fn set_read(
        &self,
        user_id: &Uuid,
        notification_id: &Uuid,
        is_read: bool,
    ) -> Result<Notification, NotificationError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, kind, title, message, related_type, related_id, is_read, created_at
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(notification_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(NotificationError::NotFound)?;

        let notification = map_notification(&row);
        if notification.user_id != *user_id {
            return Err(NotificationError::Forbidden);
        }

        let row = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = $1
            WHERE id = $2
            RETURNING id, user_id, kind, title, message, related_type, related_id, is_read, created_at
            "#,
        )
        .bind(is_read)
        .bind(notification_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_notification(&row))
    }

    /// Marks every unread notification of the user as read, returning the count.
    pub async fn mark_all_read(&self, user_id: &Uuid) -> Result<u64, NotificationError> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = true WHERE user_id = $1 AND is_read = false")
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}

fn map_notification(row: &PgRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind: row.get("kind"),
        title: row.get("title"),
        message: row.get("message"),
        related_type: row.get("related_type"),
        related_id: row.get("related_id"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    }
}
