// src/web/handlers/system_handlers.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

use crate::core::Database;
use crate::web::types::HealthResponse;

pub async fn health_handler(db: &State<Database>) -> (Status, Json<HealthResponse>) {
    match db.health_check().await {
        Ok(()) => (
            Status::Ok,
            Json(HealthResponse {
                status: "ok",
                database: "up",
                version: env!("CARGO_PKG_VERSION"),
            }),
        ),
        Err(e) => {
            error!("Health check failed: {:#}", e);
            (
                Status::ServiceUnavailable,
                Json(HealthResponse {
                    status: "degraded",
                    database: "down",
                    version: env!("CARGO_PKG_VERSION"),
                }),
            )
        }
    }
}
