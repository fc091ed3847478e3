use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::interval;

use crate::services::dispatch::DispatchService;
use crate::services::store::{CampaignStore, OutboxEvento};
use crate::utils::logging::*;
use crate::utils::AppResult;

const BACKOFF_INICIAL_MS: u64 = 1_000;
const BACKOFF_MAXIMO_MS: u64 = 300_000;

/// Backoff exponencial entre tentativas de um mesmo evento.
pub fn atraso_backoff(tentativas: i32) -> std::time::Duration {
    let expoente = tentativas.max(0).min(30) as u32;
    let ms = BACKOFF_INICIAL_MS
        .saturating_mul(2u64.saturating_pow(expoente))
        .min(BACKOFF_MAXIMO_MS);
    std::time::Duration::from_millis(ms)
}

/// Evento pronto para nova tentativa: nunca tentado, ou já passou o backoff
/// da última falha.
pub fn evento_devido(evento: &OutboxEvento, agora: DateTime<Utc>) -> bool {
    match evento.ultima_tentativa_em {
        None => true,
        Some(ultima) => {
            let atraso = chrono::Duration::from_std(atraso_backoff(evento.tentativas))
                .unwrap_or_else(|_| chrono::Duration::seconds(300));
            agora >= ultima + atraso
        }
    }
}

/// Despachante do outbox de notificações de início.
///
/// O evento é gravado na mesma transação da mudança de status; aqui ele é
/// drenado com retry até entregar ou esgotar as tentativas.
pub struct OutboxDispatcher {
    store: CampaignStore,
    dispatch: DispatchService,
    intervalo_segundos: u64,
    max_tentativas: i32,
}

impl OutboxDispatcher {
    pub fn new(
        store: CampaignStore,
        dispatch: DispatchService,
        intervalo_segundos: u64,
        max_tentativas: i32,
    ) -> Self {
        Self {
            store,
            dispatch,
            intervalo_segundos,
            max_tentativas,
        }
    }

    pub async fn drenar(&self) -> AppResult<()> {
        let eventos = self.store.eventos_pendentes(20).await?;
        let agora = Utc::now();

        for evento in eventos {
            if !evento_devido(&evento, agora) {
                continue;
            }

            let resultado = match evento.tipo_evento.as_str() {
                "iniciar_campanha" => self.dispatch.notificar_inicio(evento.campanha_id).await,
                outro => {
                    log_warning(&format!(
                        "Evento {} com tipo desconhecido '{}'; marcando falha",
                        evento.id, outro
                    ));
                    self.store
                        .registrar_falha_evento(evento.id, self.max_tentativas)
                        .await?;
                    continue;
                }
            };

            match resultado {
                Ok(()) => {
                    self.store.marcar_evento_enviado(evento.id).await?;
                }
                Err(e) => {
                    log_warning(&format!(
                        "Tentativa {} do evento {} falhou: {}",
                        evento.tentativas + 1,
                        evento.id,
                        e
                    ));
                    self.store
                        .registrar_falha_evento(evento.id, self.max_tentativas)
                        .await?;
                }
            }
        }

        Ok(())
    }

    pub fn start_scheduler(self: Arc<Self>) {
        let dispatcher = self;
        let segundos = dispatcher.intervalo_segundos;

        tokio::spawn(async move {
            let mut ticker = interval(std::time::Duration::from_secs(segundos));

            loop {
                ticker.tick().await;

                if let Err(e) = dispatcher.drenar().await {
                    log_error(&format!("Falha ao drenar outbox: {}", e));
                }
            }
        });

        log_info(&format!(
            "✅ Despachante do outbox iniciado (intervalo: {}s)",
            segundos
        ));
    }
}
