use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::models::{
    Campanha, ContagemStatus, EdicaoCampanha, NovaCampanhaRequest, ProgressoCampanha,
    StatusCampanha,
};
use crate::utils::logging::*;
use crate::utils::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FiltroUsuario {
    pub usuario_id: Uuid,
}

/// Linha da lista de disparos: a campanha e seu progresso, calculado pela
/// mesma função usada pelo monitor.
#[derive(Debug, Serialize)]
pub struct CampanhaComProgresso {
    #[serde(flatten)]
    pub campanha: Campanha,
    pub progresso: ProgressoCampanha,
}

/// POST /api/campanhas — fluxo de criação completo (validação, fan-out,
/// despacho).
pub async fn criar_campanha(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NovaCampanhaRequest>,
) -> Result<Json<Value>, AppError> {
    let start_time = Instant::now();
    log_request_received("/api/campanhas", "POST");

    let resposta = state.creator.criar(req).await?;

    let processing_time = start_time.elapsed().as_millis() as u64;
    log_request_processed("/api/campanhas", 200, processing_time);

    Ok(Json(json!({
        "success": true,
        "campanha": resposta.campanha,
        "leads_distribuidos": resposta.leads_distribuidos
    })))
}

/// GET /api/campanhas — todas as campanhas do usuário com progresso ao vivo.
pub async fn listar_campanhas(
    State(state): State<Arc<AppState>>,
    Query(filtro): Query<FiltroUsuario>,
) -> Result<Json<Value>, AppError> {
    let campanhas = state.store.listar(filtro.usuario_id).await?;

    let ids: Vec<Uuid> = campanhas.iter().map(|c| c.id).collect();
    let contagens = state.store.contagens(&ids).await?;

    let linhas: Vec<CampanhaComProgresso> = campanhas
        .into_iter()
        .map(|campanha| {
            let contagem = contagens
                .get(&campanha.id)
                .copied()
                .unwrap_or_else(ContagemStatus::default);
            let progresso = ProgressoCampanha::calcular(campanha.status_campanha(), &contagem);
            CampanhaComProgresso {
                campanha,
                progresso,
            }
        })
        .collect();

    Ok(Json(json!({
        "count": linhas.len(),
        "campanhas": linhas
    })))
}

/// GET /api/campanhas/:id
pub async fn obter_campanha(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let campanha = state.store.exigir(id).await?;
    let contagem = state.store.contagem_da_campanha(id).await?;
    let progresso = ProgressoCampanha::calcular(campanha.status_campanha(), &contagem);

    Ok(Json(json!({
        "campanha": campanha,
        "progresso": progresso
    })))
}

/// GET /api/campanhas/:id/leads — registros de disparo da campanha, com o
/// status reportado pelo motor.
pub async fn listar_leads_campanha(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state.store.exigir(id).await?;
    let leads = state.store.listar_leads(id).await?;

    Ok(Json(json!({
        "count": leads.len(),
        "leads": leads
    })))
}

/// POST /api/campanhas/:id/iniciar — muda o status e grava a notificação de
/// início na mesma transação (outbox).
pub async fn iniciar_campanha(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let campanha = state
        .store
        .iniciar_com_evento(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Campanha {} não encontrada", id)))?;

    log_status_campanha(&id.to_string(), &campanha.status);

    Ok(Json(json!({
        "success": true,
        "campanha": campanha
    })))
}

/// POST /api/campanhas/:id/pausar
pub async fn pausar_campanha(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let campanha = state
        .store
        .atualizar_status(id, StatusCampanha::Pausado)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Campanha {} não encontrada", id)))?;

    log_status_campanha(&id.to_string(), &campanha.status);

    Ok(Json(json!({
        "success": true,
        "campanha": campanha
    })))
}

/// DELETE /api/campanhas/:id — remove campanha e registros de disparo.
pub async fn excluir_campanha(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let removida = state.store.excluir(id).await?;

    if !removida {
        return Err(AppError::NotFound(format!("Campanha {} não encontrada", id)));
    }

    log_info(&format!("Campanha {} excluída com seus registros", id));

    Ok(Json(json!({ "success": true })))
}

/// POST /api/campanhas/:id/duplicar — cópia em rascunho com leads recopiados.
pub async fn duplicar_campanha(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let copia = state
        .store
        .duplicar(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Campanha {} não encontrada", id)))?;

    log_info(&format!(
        "Campanha {} duplicada como {} ({} leads)",
        id, copia.id, copia.total_leads
    ));

    Ok(Json(json!({
        "success": true,
        "campanha": copia
    })))
}

/// PATCH /api/campanhas/:id — edição de nome/delays/mensagem apenas.
pub async fn editar_campanha(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(edicao): Json<EdicaoCampanha>,
) -> Result<Json<Value>, AppError> {
    let campanha = state
        .store
        .editar(id, edicao)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Campanha {} não encontrada", id)))?;

    Ok(Json(json!({
        "success": true,
        "campanha": campanha
    })))
}
