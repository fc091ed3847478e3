use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration};
use uuid::Uuid;

use crate::models::{Campanha, ContagemStatus, ProgressoCampanha, StatusCampanha};
use crate::services::store::CampaignStore;
use crate::utils::logging::*;
use crate::utils::AppResult;

/// Entrada do snapshot do monitor para uma campanha.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressoMonitor {
    pub campanha_id: Uuid,
    pub nome_campanha: String,
    pub status: StatusCampanha,
    pub progresso: ProgressoCampanha,
    pub atualizado_em: DateTime<Utc>,
}

/// Monta o snapshot de progresso das campanhas a partir da contagem agrupada.
///
/// Campanha sem nenhuma linha em disparo_leads entra com contagem zerada
/// (situação "sem envios"), não some do snapshot.
pub fn montar_snapshot(
    campanhas: &[Campanha],
    contagens: &HashMap<Uuid, ContagemStatus>,
) -> Vec<ProgressoMonitor> {
    let agora = Utc::now();

    campanhas
        .iter()
        .map(|campanha| {
            let contagem = contagens.get(&campanha.id).copied().unwrap_or_default();
            ProgressoMonitor {
                campanha_id: campanha.id,
                nome_campanha: campanha.nome_campanha.clone(),
                status: campanha.status_campanha(),
                progresso: ProgressoCampanha::calcular(campanha.status_campanha(), &contagem),
                atualizado_em: agora,
            }
        })
        .collect()
}

/// Rastreador de progresso compartilhado.
///
/// Um único timer alimenta todas as superfícies (monitor e lista de
/// disparos), no lugar dos pollers independentes de 3s e 60s que as telas
/// originais mantinham sobre as mesmas linhas.
pub struct ProgressTracker {
    store: CampaignStore,
    intervalo_segundos: u64,
    max_campanhas: i64,
    cache: RwLock<HashMap<Uuid, Vec<ProgressoMonitor>>>,
}

impl ProgressTracker {
    pub fn new(store: CampaignStore, intervalo_segundos: u64, max_campanhas: i64) -> Self {
        Self {
            store,
            intervalo_segundos,
            max_campanhas,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot em cache do usuário. Vazio quando o usuário não tem campanhas.
    pub async fn snapshot(&self, usuario_id: Uuid) -> Vec<ProgressoMonitor> {
        let cache = self.cache.read().await;
        cache.get(&usuario_id).cloned().unwrap_or_default()
    }

    /// Recarrega o snapshot de todos os usuários: campanhas recentes + uma
    /// consulta agrupada de contagens por usuário.
    pub async fn atualizar(&self) -> AppResult<()> {
        let usuarios = self.store.listar_usuarios().await?;
        let mut novo_cache = HashMap::with_capacity(usuarios.len());

        for usuario_id in usuarios {
            let campanhas = self
                .store
                .listar_recentes(usuario_id, self.max_campanhas)
                .await?;

            let ids: Vec<Uuid> = campanhas.iter().map(|c| c.id).collect();
            let contagens = self.store.contagens(&ids).await?;

            novo_cache.insert(usuario_id, montar_snapshot(&campanhas, &contagens));
        }

        let mut cache = self.cache.write().await;
        *cache = novo_cache;

        Ok(())
    }

    /// Timer compartilhado. Falha em um tick mantém o snapshot anterior; o
    /// próximo tick tenta de novo.
    pub fn start_scheduler(self: Arc<Self>) {
        let tracker = self;
        let segundos = tracker.intervalo_segundos;

        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(segundos));

            loop {
                ticker.tick().await;

                if let Err(e) = tracker.atualizar().await {
                    log_error(&format!("Falha ao atualizar snapshot de progresso: {}", e));
                }
            }
        });

        log_info(&format!(
            "✅ Rastreador de progresso iniciado (intervalo: {}s)",
            segundos
        ));
    }
}
