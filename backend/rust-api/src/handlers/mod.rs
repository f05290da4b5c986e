use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use mongodb::Database;
use serde_json::json;
use std::sync::Arc;

use crate::config::ServiceKind;
use crate::metrics;

pub mod auth;
pub mod category;
pub mod question;
pub mod quiz;
pub mod registration;
pub mod report;

/// What `/health` needs to know about the running service.
pub struct HealthState {
    pub service: ServiceKind,
    pub mongo: Option<Database>,
}

/// GET /health
pub async fn health_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let mut dependencies = serde_json::Map::new();
    let mut healthy = true;

    if let Some(db) = &state.mongo {
        let mongo_health = check_mongodb(db).await;
        healthy = mongo_health.get("status").and_then(|v| v.as_str()) == Some("healthy");
        dependencies.insert("mongodb".to_string(), json!(mongo_health));
    }

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(json!({
            "status": if healthy { "healthy" } else { "degraded" },
            "service": state.service.service_name(),
            "version": env!("CARGO_PKG_VERSION"),
            "dependencies": dependencies
        })),
    )
}

async fn check_mongodb(db: &Database) -> serde_json::Map<String, serde_json::Value> {
    let mut result = serde_json::Map::new();

    match tokio::time::timeout(
        std::time::Duration::from_secs(1),
        db.run_command(mongodb::bson::doc! { "ping": 1 }),
    )
    .await
    {
        Ok(Ok(_)) => {
            result.insert("status".to_string(), json!("healthy"));
        }
        Ok(Err(e)) => {
            result.insert("status".to_string(), json!("unhealthy"));
            result.insert("error".to_string(), json!(format!("MongoDB error: {}", e)));
        }
        Err(_) => {
            result.insert("status".to_string(), json!("unhealthy"));
            result.insert("error".to_string(), json!("MongoDB timeout after 1s"));
        }
    }

    result
}

/// GET /metrics
pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}
