//! Main entry point for the Staynest marketplace backend server.
//! This crate wires the database pool, the notification dispatcher, and the
//! REST + WebSocket API together.

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Result, middleware::Logger, web};
use auth_services::middleware::AuthMiddleware;
use notification_services::{Dispatcher, NotificationService};
use postgres::database::*;
use web_handlers::*;

mod ws;

async fn api_health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    })))
}

fn allowed_origins() -> Vec<String> {
    std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting Staynest marketplace server...");

    // Create database connection pool
    let pool = match create_connection_pool().await {
        Ok(pool) => {
            log::info!("🗃️ Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("❌ Database connection test failed: {}", e);
            }
            pool
        }
        Err(e) => {
            log::error!("❌ Failed to create database pool: {}", e);
            log::error!("💡 Make sure PostgreSQL is running and DATABASE_URL is set");
            std::process::exit(1);
        }
    };

    // Create the live-session dispatcher and notification service
    let dispatcher = Dispatcher::new();
    let notification_service = NotificationService::new(pool.clone(), dispatcher);
    log::info!("📨 Notification dispatcher initialized");

    let origins = allowed_origins();
    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    log::info!("🌐 Server will be available at: http://{}", bind_addr);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
            .allow_any_header()
            .max_age(3600);
        for origin in &origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .wrap(Logger::default())
            .wrap(cors)
            .service(
                web::scope("/api")
                    // Public routes
                    .route("/health", web::get().to(api_health))
                    .route("/ws", web::get().to(ws::ws_connect))
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(register))
                            .route("/login", web::post().to(login)),
                    )
                    // Property search and reads are public; writes are nested
                    // under the authenticated scope below
                    .route("/properties", web::get().to(search_properties))
                    .route("/properties/{id}", web::get().to(get_property))
                    .route(
                        "/properties/{id}/reviews",
                        web::get().to(list_property_reviews),
                    )
                    .route(
                        "/properties/{id}/availability",
                        web::get().to(get_availability),
                    )
                    // Protected routes (require authentication)
                    .service(
                        web::scope("/users")
                            .wrap(AuthMiddleware)
                            .route("/me", web::get().to(get_profile))
                            .route("/me", web::put().to(update_profile)),
                    )
                    .service(
                        web::scope("/properties")
                            .wrap(AuthMiddleware)
                            .route("", web::post().to(create_property))
                            .route("/{id}", web::patch().to(update_property))
                            .route("/{id}", web::delete().to(delete_property))
                            .route("/{id}/availability", web::put().to(put_availability)),
                    )
                    .service(
                        web::scope("/bookings")
                            .wrap(AuthMiddleware)
                            .route("", web::post().to(create_booking))
                            .route("", web::get().to(list_bookings))
                            .route("/{id}", web::get().to(get_booking))
                            .route("/{id}", web::patch().to(update_booking_status))
                            .route("/{id}/reviews", web::post().to(create_review)),
                    )
                    .service(
                        web::scope("/conversations")
                            .wrap(AuthMiddleware)
                            .route("", web::get().to(list_conversations))
                            .route("", web::post().to(create_conversation))
                            .route("/{id}/messages", web::get().to(list_messages))
                            .route("/{id}/messages", web::post().to(send_message)),
                    )
                    .service(
                        web::scope("/messages")
                            .wrap(AuthMiddleware)
                            .route("/{id}", web::patch().to(mark_message_read)),
                    )
                    .service(
                        web::scope("/notifications")
                            .wrap(AuthMiddleware)
                            .route("", web::get().to(list_notifications))
                            .route("", web::patch().to(mark_all_notifications_read))
                            .route("/{id}", web::patch().to(set_notification_read)),
                    )
                    .service(
                        web::scope("/admin")
                            .wrap(AuthMiddleware)
                            .route("/actions", web::post().to(record_admin_action))
                            .route("/actions", web::get().to(list_admin_actions)),
                    ),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
