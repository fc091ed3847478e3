use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::time::Instant;

use crate::models::{RelatorioDisparo, StatusDisparo};
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use crate::AppState;

/// POST /webhooks/disparo — relatórios do motor de disparo.
///
/// Único caminho de mutação de disparo_leads depois da criação. Aceita dois
/// formatos no mesmo endpoint: resultado por lead e evento de campanha.
pub async fn handle_relatorio_disparo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request<Body>,
) -> Result<Json<Value>, AppError> {
    let start_time = Instant::now();
    log_request_received("/webhooks/disparo", "POST");

    let body_bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to read request body: {}", e)))?;

    // Verificar assinatura do webhook (se configurado)
    if state.settings.dispatch.validate_signature {
        if let Some(ref secret) = state.settings.dispatch.webhook_secret {
            verify_webhook_signature(&headers, &body_bytes, secret)?;
        }
    }

    let body_str = String::from_utf8(body_bytes.to_vec())
        .map_err(|e| AppError::ValidationError(format!("Invalid UTF-8 in request body: {}", e)))?;

    let relatorio: RelatorioDisparo = serde_json::from_str(&body_str).map_err(|e| {
        log_validation_error("payload", &format!("Invalid JSON: {}", e));
        AppError::ValidationError(format!("Could not parse delivery report: {}", e))
    })?;

    let resposta = match relatorio {
        RelatorioDisparo::Lead(r) => {
            // Relatório não pode regredir um registro para pendente
            if r.status == StatusDisparo::Pendente {
                return Err(AppError::ValidationError(
                    "Relatório de lead não pode voltar para 'pendente'".to_string(),
                ));
            }

            let linhas = state
                .store
                .atualizar_status_lead(r.campanha_id, r.lead_id, r.status)
                .await?;

            if linhas == 0 {
                log_warning(&format!(
                    "Relatório para lead {} desconhecido na campanha {}; ignorado",
                    r.lead_id, r.campanha_id
                ));
                json!({ "status": "ignored" })
            } else {
                json!({ "status": "success" })
            }
        }
        RelatorioDisparo::Campanha(r) => {
            if !r.evento.terminal() {
                return Err(AppError::ValidationError(format!(
                    "Evento de campanha deve ser terminal, recebido '{}'",
                    r.evento
                )));
            }

            let campanha = state
                .store
                .atualizar_status(r.campanha_id, r.evento)
                .await?;

            match campanha {
                Some(c) => {
                    log_status_campanha(&c.id.to_string(), &c.status);
                    json!({ "status": "success" })
                }
                None => {
                    log_warning(&format!(
                        "Evento para campanha {} desconhecida; ignorado",
                        r.campanha_id
                    ));
                    json!({ "status": "ignored" })
                }
            }
        }
    };

    let processing_time = start_time.elapsed().as_millis() as u64;
    log_request_processed("/webhooks/disparo", 200, processing_time);

    Ok(Json(resposta))
}

fn verify_webhook_signature(headers: &HeaderMap, body: &[u8], secret: &str) -> AppResult<()> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let signature_header = headers
        .get("X-Disparo-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::ValidationError("Missing X-Disparo-Signature header".to_string())
        })?;

    // Remove o prefixo "sha256=" se presente
    let signature = signature_header
        .strip_prefix("sha256=")
        .unwrap_or(signature_header);

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::ValidationError(format!("Invalid secret key: {}", e)))?;

    mac.update(body);
    let expected = hex::encode(mac.finalize().into_bytes());

    if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
        log_validation_error("webhook_signature", "Invalid signature");
        return Err(AppError::ValidationError(
            "Invalid webhook signature".to_string(),
        ));
    }

    Ok(())
}

// Comparação de tempo constante para evitar timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
