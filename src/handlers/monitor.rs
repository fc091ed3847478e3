use axum::{
    extract::{Query, State},
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::handlers::campanhas::FiltroUsuario;
use crate::utils::AppError;
use crate::AppState;

/// GET /api/monitor — snapshot em cache do rastreador compartilhado. Lista
/// vazia quando o usuário não tem campanhas.
pub async fn obter_monitor(
    State(state): State<Arc<AppState>>,
    Query(filtro): Query<FiltroUsuario>,
) -> Result<Json<Value>, AppError> {
    let snapshot = state.tracker.snapshot(filtro.usuario_id).await;

    Ok(Json(json!({
        "count": snapshot.len(),
        "campanhas": snapshot
    })))
}

/// POST /api/monitor/refresh — atualização imediata, independente do timer.
pub async fn atualizar_monitor(
    State(state): State<Arc<AppState>>,
    Query(filtro): Query<FiltroUsuario>,
) -> Result<Json<Value>, AppError> {
    state.tracker.atualizar().await?;

    let snapshot = state.tracker.snapshot(filtro.usuario_id).await;

    Ok(Json(json!({
        "success": true,
        "count": snapshot.len(),
        "campanhas": snapshot
    })))
}
