use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::utils::AppError;
use crate::AppState;

/// GET /admin/outbox — últimos eventos do outbox, para inspeção de entregas
/// de notificação travadas ou esgotadas.
pub async fn listar_outbox(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let eventos = state.store.listar_eventos(50).await?;

    Ok(Json(json!({
        "count": eventos.len(),
        "eventos": eventos
    })))
}
