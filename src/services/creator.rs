use serde_json::json;
use whatsapp::{GatewayClient, InstanciaInfo};

use crate::models::{Campanha, NovaCampanhaRequest, NovoDisparoLead, StatusCampanha, TipoCampanha};
use crate::services::dispatch::DispatchService;
use crate::services::store::{CampaignStore, NovaCampanha};
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

/// Etapas da saga de criação. Não há transação cobrindo banco + webhook; a
/// etapa alcançada decide a compensação em caso de falha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtapaSaga {
    Criada,
    LeadsDistribuidos,
    Despachada,
    Confirmada,
    FalhaNoDespacho,
}

/// Resultado da criação: a campanha persistida e quantos registros de
/// disparo foram distribuídos.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RespostaCriacao {
    pub campanha: Campanha,
    pub leads_distribuidos: usize,
}

/// Quantidade de instâncias distintas selecionadas.
pub fn instancias_distintas(instancias: &[String]) -> usize {
    let mut vistas: Vec<&str> = Vec::new();
    for nome in instancias {
        if !vistas.contains(&nome.as_str()) {
            vistas.push(nome);
        }
    }
    vistas.len()
}

/// Regras de formulário, todas verificadas antes de qualquer escrita.
pub fn validar_requisicao(req: &NovaCampanhaRequest) -> AppResult<()> {
    let Some(tipo) = req.tipo_campanha else {
        return Err(AppError::ValidationError(
            "Selecione o tipo de campanha".to_string(),
        ));
    };

    if req.nome_campanha.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Informe o nome da campanha".to_string(),
        ));
    }

    let distintas = instancias_distintas(&req.instancias);
    match tipo {
        TipoCampanha::MultiIa => {
            if distintas < 2 {
                return Err(AppError::ValidationError(
                    "Campanhas multi_ia exigem ao menos 2 instâncias distintas".to_string(),
                ));
            }
        }
        TipoCampanha::Simples | TipoCampanha::Ia => {
            if distintas != 1 {
                return Err(AppError::ValidationError(
                    "Selecione exatamente uma instância conectada".to_string(),
                ));
            }
        }
    }

    if req.leads.is_empty() {
        return Err(AppError::ValidationError(
            "Selecione ao menos um lead".to_string(),
        ));
    }

    if req.delay_min_segundos > req.delay_max_segundos {
        return Err(AppError::ValidationError(
            "Delay mínimo não pode ser maior que o máximo".to_string(),
        ));
    }

    if let Some(arquivo) = &req.arquivo {
        use base64::Engine;
        if base64::engine::general_purpose::STANDARD
            .decode(&arquivo.conteudo_base64)
            .is_err()
        {
            return Err(AppError::ValidationError(
                "Arquivo anexado não está em base64 válido".to_string(),
            ));
        }
    }

    Ok(())
}

/// Campanha agendada nasce `agendado`; sem agendamento, entra direto em
/// andamento.
pub fn status_inicial(agendada: bool) -> StatusCampanha {
    if agendada {
        StatusCampanha::Agendado
    } else {
        StatusCampanha::EmAndamento
    }
}

/// Fluxo de criação de campanha: valida, persiste, distribui os registros de
/// disparo e despacha para o motor externo.
#[derive(Clone)]
pub struct CampaignCreator {
    store: CampaignStore,
    dispatch: DispatchService,
    gateway: GatewayClient,
}

impl CampaignCreator {
    pub fn new(store: CampaignStore, dispatch: DispatchService, gateway: GatewayClient) -> Self {
        Self {
            store,
            dispatch,
            gateway,
        }
    }

    /// Resolve os nomes selecionados contra o gateway: toda instância precisa
    /// existir e estar com a sessão conectada.
    async fn resolver_instancias(&self, nomes: &[String]) -> AppResult<Vec<InstanciaInfo>> {
        let registradas = self.gateway.listar_instancias().await?;
        let mut resolvidas = Vec::with_capacity(nomes.len());

        for nome in nomes {
            let Some(info) = registradas.iter().find(|i| &i.instance == nome) else {
                return Err(AppError::ValidationError(format!(
                    "Instância '{}' não está registrada no gateway",
                    nome
                )));
            };

            if !info.conectada() {
                return Err(AppError::ValidationError(format!(
                    "Instância '{}' não está conectada",
                    nome
                )));
            }

            resolvidas.push(info.clone());
        }

        Ok(resolvidas)
    }

    pub async fn criar(&self, req: NovaCampanhaRequest) -> AppResult<RespostaCriacao> {
        validar_requisicao(&req)?;
        let instancias = self.resolver_instancias(&req.instancias).await?;

        let tipo = req
            .tipo_campanha
            .ok_or_else(|| AppError::ValidationError("Selecione o tipo de campanha".to_string()))?
            .to_string();
        let status = status_inicial(req.agendado_para.is_some());

        // Blob de configuração com tudo que o formulário enviou, menos o
        // conteúdo do arquivo (vai só no payload de despacho).
        let configuracao = json!({
            "tipo_campanha": tipo,
            "instancias": req.instancias,
            "delay_min_segundos": req.delay_min_segundos,
            "delay_max_segundos": req.delay_max_segundos,
            "delay_mensagem_segundos": req.delay_mensagem_segundos,
            "mensagem_padrao": req.mensagem_padrao,
            "cliente_id": req.cliente_id,
            "pasta_id": req.pasta_id,
            "pasta_nome": req.pasta_nome,
            "arquivo_nome": req.arquivo.as_ref().map(|a| a.nome.clone()),
            "agendado_para": req.agendado_para,
        });

        // Etapa 1: campanha persistida. total_leads é fixado aqui e não é
        // recalculado depois.
        let campanha = self
            .store
            .criar_campanha(NovaCampanha {
                usuario_id: req.usuario_id,
                cliente_id: req.cliente_id,
                pasta_id: req.pasta_id,
                nome_campanha: req.nome_campanha.trim().to_string(),
                tipo_campanha: tipo,
                status: status.to_string(),
                total_leads: req.leads.len() as i32,
                delay_min_segundos: req.delay_min_segundos,
                delay_max_segundos: req.delay_max_segundos,
                delay_mensagem_segundos: req.delay_mensagem_segundos,
                mensagem_padrao: req.mensagem_padrao.clone(),
                instancia_whatsapp: req.instancias[0].clone(),
                configuracao,
                agendado_para: req.agendado_para,
            })
            .await?;

        let mut etapa = EtapaSaga::Criada;
        tracing::debug!("Campanha {} em {:?}", campanha.id, etapa);
        log_campanha_criada(
            &campanha.id.to_string(),
            &campanha.nome_campanha,
            req.leads.len(),
        );

        // Etapa 2: fan-out — um registro pendente por lead selecionado.
        let novos: Vec<NovoDisparoLead> = req.leads.iter().map(NovoDisparoLead::do_lead).collect();
        let leads_distribuidos = self.store.distribuir_leads(campanha.id, &novos).await?;
        etapa = EtapaSaga::LeadsDistribuidos;
        tracing::debug!("Campanha {} em {:?}", campanha.id, etapa);

        // Etapa 3: despacho para o motor externo.
        let payload = DispatchService::montar_payload(&campanha, &req, &instancias);
        etapa = EtapaSaga::Despachada;
        tracing::debug!("Campanha {} em {:?}", campanha.id, etapa);

        match self.dispatch.despachar(campanha.id, &payload).await {
            Ok(()) => {
                etapa = EtapaSaga::Confirmada;
                log_info(&format!(
                    "Saga de criação da campanha {} concluída ({:?})",
                    campanha.id, etapa
                ));
                Ok(RespostaCriacao {
                    campanha,
                    leads_distribuidos,
                })
            }
            Err(erro) => {
                // Compensação: campanha marcada com erro, registros de
                // disparo ficam para retry manual.
                etapa = EtapaSaga::FalhaNoDespacho;
                log_warning(&format!(
                    "Saga da campanha {} parou em {:?}; marcando erro",
                    campanha.id, etapa
                ));

                if let Err(e) = self
                    .store
                    .atualizar_status(campanha.id, StatusCampanha::Erro)
                    .await
                {
                    log_error(&format!(
                        "Falha na compensação da campanha {}: {}",
                        campanha.id, e
                    ));
                }

                Err(erro)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadSelecionado;
    use uuid::Uuid;

    fn requisicao_valida() -> NovaCampanhaRequest {
        NovaCampanhaRequest {
            usuario_id: Uuid::new_v4(),
            cliente_id: None,
            pasta_id: None,
            pasta_nome: None,
            tipo_campanha: Some(TipoCampanha::Simples),
            nome_campanha: "Campanha".to_string(),
            delay_min_segundos: 30,
            delay_max_segundos: 90,
            delay_mensagem_segundos: 5,
            mensagem_padrao: "Olá!".to_string(),
            instancias: vec!["vendas-01".to_string()],
            leads: vec![LeadSelecionado {
                id: Uuid::new_v4(),
                nome: "Maria".to_string(),
                telefone: "5511988880001".to_string(),
                empresa: None,
                site: None,
            }],
            arquivo: None,
            agendado_para: None,
        }
    }

    #[test]
    fn test_requisicao_valida_passa() {
        assert!(validar_requisicao(&requisicao_valida()).is_ok());
    }

    #[test]
    fn test_bloqueia_sem_tipo() {
        let mut req = requisicao_valida();
        req.tipo_campanha = None;
        assert!(matches!(
            validar_requisicao(&req),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_bloqueia_nome_vazio() {
        let mut req = requisicao_valida();
        req.nome_campanha = "   ".to_string();
        assert!(matches!(
            validar_requisicao(&req),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_bloqueia_sem_leads() {
        let mut req = requisicao_valida();
        req.leads.clear();
        assert!(matches!(
            validar_requisicao(&req),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_multi_ia_exige_duas_instancias_distintas() {
        let mut req = requisicao_valida();
        req.tipo_campanha = Some(TipoCampanha::MultiIa);

        req.instancias = vec!["vendas-01".to_string()];
        assert!(validar_requisicao(&req).is_err());

        // Nomes repetidos não contam duas vezes
        req.instancias = vec!["vendas-01".to_string(), "vendas-01".to_string()];
        assert!(validar_requisicao(&req).is_err());

        req.instancias = vec!["vendas-01".to_string(), "vendas-02".to_string()];
        assert!(validar_requisicao(&req).is_ok());
    }

    #[test]
    fn test_simples_exige_exatamente_uma_instancia() {
        let mut req = requisicao_valida();

        req.instancias = vec![];
        assert!(validar_requisicao(&req).is_err());

        req.instancias = vec!["vendas-01".to_string(), "vendas-02".to_string()];
        assert!(validar_requisicao(&req).is_err());
    }

    #[test]
    fn test_bloqueia_delay_invertido() {
        let mut req = requisicao_valida();
        req.delay_min_segundos = 120;
        req.delay_max_segundos = 60;
        assert!(validar_requisicao(&req).is_err());
    }

    #[test]
    fn test_bloqueia_arquivo_fora_de_base64() {
        let mut req = requisicao_valida();
        req.arquivo = Some(crate::models::ArquivoAnexo {
            nome: "catalogo.pdf".to_string(),
            mimetype: "application/pdf".to_string(),
            conteudo_base64: "não é base64!!!".to_string(),
        });
        assert!(validar_requisicao(&req).is_err());

        req.arquivo = Some(crate::models::ArquivoAnexo {
            nome: "catalogo.pdf".to_string(),
            mimetype: "application/pdf".to_string(),
            conteudo_base64: "JVBERi0xLjQ=".to_string(),
        });
        assert!(validar_requisicao(&req).is_ok());
    }

    #[test]
    fn test_instancias_distintas() {
        assert_eq!(instancias_distintas(&[]), 0);
        assert_eq!(
            instancias_distintas(&["a".to_string(), "a".to_string(), "b".to_string()]),
            2
        );
    }

    #[test]
    fn test_status_inicial() {
        assert_eq!(status_inicial(true), StatusCampanha::Agendado);
        assert_eq!(status_inicial(false), StatusCampanha::EmAndamento);
    }
}
