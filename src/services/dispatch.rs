use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;
use whatsapp::InstanciaInfo;

use crate::models::{Campanha, NovaCampanhaRequest};
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

/// Cliente do motor de disparo externo (n8n).
///
/// O motor é quem de fato envia as mensagens; aqui só montamos o payload de
/// despacho e notificamos início de campanha.
#[derive(Clone)]
pub struct DispatchService {
    client: Client,
    webhook_url: String,
    backend_url: String,
}

impl DispatchService {
    pub fn new(webhook_url: String, backend_url: String) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
            backend_url: backend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Monta o payload de despacho no contrato esperado pelo motor: metadados
    /// da campanha, snapshot completo dos leads, credenciais das instâncias e
    /// arquivo em base64 quando houver.
    pub fn montar_payload(
        campanha: &Campanha,
        req: &NovaCampanhaRequest,
        instancias: &[InstanciaInfo],
    ) -> Value {
        let principal = instancias.first();

        json!({
            "campaignType": campanha.tipo_campanha,
            "name": campanha.nome_campanha,
            "minDelay": campanha.delay_min_segundos,
            "maxDelay": campanha.delay_max_segundos,
            "messageDelay": campanha.delay_mensagem_segundos,
            "messageText": campanha.mensagem_padrao,
            "selectedLeads": req.leads,
            "clientId": req.cliente_id,
            "folderId": req.pasta_id,
            "folderName": req.pasta_nome,
            "userId": campanha.usuario_id,
            "campaignId": campanha.id,
            "file": req.arquivo.as_ref().map(|a| a.conteudo_base64.clone()),
            "mimetype": req.arquivo.as_ref().map(|a| a.mimetype.clone()),
            "fileName": req.arquivo.as_ref().map(|a| a.nome.clone()),
            "instance": principal.map(|i| i.instance.clone()),
            "instanceToken": principal.map(|i| i.token.clone()),
            "instances": instancias.iter().map(|i| json!({
                "instance": i.instance,
                "token": i.token,
                "profileName": i.profile_name,
                "phoneNumber": i.phone_number,
            })).collect::<Vec<_>>(),
            "instanceCount": instancias.len(),
        })
    }

    /// Envia o payload de despacho. Qualquer resposta 2xx vale como aceite; o
    /// corpo não faz parte do contrato e é apenas logado.
    pub async fn despachar(&self, campanha_id: Uuid, payload: &Value) -> AppResult<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| AppError::DispatchError(format!("Falha ao chamar o motor: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            log_despacho_enviado(&campanha_id.to_string(), &self.webhook_url);
            if !body.is_empty() {
                log_info(&format!("Resposta do motor de disparo: {}", body));
            }
            Ok(())
        } else {
            log_despacho_erro(
                &campanha_id.to_string(),
                &format!("status {} - {}", status, body),
            );
            Err(AppError::DispatchError(format!(
                "Motor de disparo respondeu {}: {}",
                status, body
            )))
        }
    }

    /// Notificação de início drenada do outbox. O worker externo também tem
    /// pickup próprio por status, então o evento é um empurrão, não a única
    /// via.
    pub async fn notificar_inicio(&self, campanha_id: Uuid) -> AppResult<()> {
        let url = format!("{}/api/campaigns/{}/start", self.backend_url, campanha_id);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| AppError::DispatchError(format!("Falha na notificação: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            log_info(&format!(
                "Notificação de início da campanha {} entregue",
                campanha_id
            ));
            Ok(())
        } else {
            Err(AppError::DispatchError(format!(
                "Notificação de início respondeu {}",
                status
            )))
        }
    }
}
