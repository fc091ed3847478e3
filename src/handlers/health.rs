use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::utils::logging::*;
use crate::AppState;

pub async fn health_check() -> Json<Value> {
    log_health_check();

    Json(json!({
        "status": "healthy",
        "service": "disparos-middleware",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn ready_check(State(state): State<Arc<AppState>>) -> Result<Json<Value>, StatusCode> {
    // Banco responde?
    let database_status = match sqlx::query("SELECT 1").execute(state.store.pool()).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    // Gateway WhatsApp responde?
    let gateway_status = match state.gateway.listar_instancias().await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let overall_ready = database_status == "connected";

    let response = json!({
        "ready": overall_ready,
        "service": "disparos-middleware",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "dependencies": {
            "database": {
                "status": database_status
            },
            "gateway": {
                "status": gateway_status,
                "base_url": state.settings.gateway.base_url
            },
            "dispatch": {
                "webhook_url": state.settings.dispatch.webhook_url
            }
        }
    });

    if overall_ready {
        Ok(Json(response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

pub async fn status_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let dispatch_configured = !state.settings.dispatch.webhook_url.is_empty();
    let gateway_configured = !state.settings.gateway.base_url.is_empty();

    Json(json!({
        "service": "disparos-middleware",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "dispatch": {
            "configured": dispatch_configured,
            "webhook_url": state.settings.dispatch.webhook_url,
            "backend_url": state.settings.dispatch.backend_url,
            "validate_signature": state.settings.dispatch.validate_signature
        },
        "gateway": {
            "configured": gateway_configured,
            "base_url": state.settings.gateway.base_url
        },
        "monitor": {
            "intervalo_segundos": state.settings.monitor.intervalo_segundos,
            "max_campanhas": state.settings.monitor.max_campanhas
        },
        "outbox": {
            "intervalo_segundos": state.settings.outbox.intervalo_segundos,
            "max_tentativas": state.settings.outbox.max_tentativas
        }
    }))
}
