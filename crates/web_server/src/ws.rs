//! WebSocket endpoint for live-session delivery.
//!
//! A client connects with its bearer token as a query parameter, is resolved
//! to a user, and joins that user's channel. Every event addressed to the
//! user is forwarded as a JSON text frame until the socket closes.

use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::broadcast;

use auth_services::jwt::JwtService;
use auth_services::types::error_envelope;
use notification_services::NotificationService;

/// Query parameters for the WebSocket handshake
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Bearer token, passed as a query parameter because browsers cannot
    /// set headers on WebSocket upgrades
    pub token: String,
}

/// Upgrades the connection and pumps the user's live events to the socket.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsQuery>,
    notifications: web::Data<NotificationService>,
) -> Result<HttpResponse, actix_web::Error> {
    let jwt_service = JwtService::new();
    let ctx = match jwt_service.resolve(&query.token) {
        Ok(ctx) => ctx,
        Err(_) => {
            return Ok(HttpResponse::Unauthorized().json(error_envelope(
                "AUTH_TOKEN_INVALID",
                "Invalid or expired token",
            )));
        }
    };

    let (response, mut session, mut msg_stream) = actix_ws::handle(&req, stream)?;
    let mut rx = notifications.dispatcher().subscribe(ctx.id).await;

    log::info!("live session opened for user {}", ctx.id);

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Ok(event) => {
                        let Ok(text) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if session.text(text).await.is_err() {
                            break;
                        }
                    }
                    // A slow consumer skips the events it missed; the
                    // persisted notification rows remain their durable record.
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("live session for user {} lagged, {} events dropped", ctx.id, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                msg = msg_stream.next() => match msg {
                    Some(Ok(actix_ws::Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(actix_ws::Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                },
            }
        }

        let _ = session.close(None).await;
        log::info!("live session closed for user {}", ctx.id);
    });

    Ok(response)
}
