use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::lead::LeadSelecionado;

/// Status do ciclo de vida de uma campanha.
///
/// `concluido`, `cancelado` e `erro` são terminais. O motor de disparo
/// externo é quem encerra campanhas; este serviço só marca `erro` como
/// compensação quando o despacho inicial falha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCampanha {
    Rascunho,
    Agendado,
    EmAndamento,
    Pausado,
    Concluido,
    Cancelado,
    Erro,
}

impl StatusCampanha {
    pub fn terminal(&self) -> bool {
        matches!(
            self,
            StatusCampanha::Concluido | StatusCampanha::Cancelado | StatusCampanha::Erro
        )
    }
}

impl std::fmt::Display for StatusCampanha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatusCampanha::Rascunho => "rascunho",
            StatusCampanha::Agendado => "agendado",
            StatusCampanha::EmAndamento => "em_andamento",
            StatusCampanha::Pausado => "pausado",
            StatusCampanha::Concluido => "concluido",
            StatusCampanha::Cancelado => "cancelado",
            StatusCampanha::Erro => "erro",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for StatusCampanha {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rascunho" => Ok(StatusCampanha::Rascunho),
            "agendado" => Ok(StatusCampanha::Agendado),
            "em_andamento" => Ok(StatusCampanha::EmAndamento),
            "pausado" => Ok(StatusCampanha::Pausado),
            "concluido" => Ok(StatusCampanha::Concluido),
            "cancelado" => Ok(StatusCampanha::Cancelado),
            "erro" => Ok(StatusCampanha::Erro),
            other => Err(format!("status de campanha desconhecido: {}", other)),
        }
    }
}

/// Tipo da campanha, define quantas instâncias são exigidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoCampanha {
    Simples,
    Ia,
    MultiIa,
}

impl std::fmt::Display for TipoCampanha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TipoCampanha::Simples => "simples",
            TipoCampanha::Ia => "ia",
            TipoCampanha::MultiIa => "multi_ia",
        };
        write!(f, "{}", s)
    }
}

/// Linha da tabela `campanhas_disparo`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Campanha {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub cliente_id: Option<Uuid>,
    pub pasta_id: Option<Uuid>,
    pub nome_campanha: String,
    pub tipo_campanha: String,
    pub status: String,
    /// Denormalizado: fixado na criação com o número de leads distribuídos,
    /// nunca recalculado a partir de disparo_leads.
    pub total_leads: i32,
    pub delay_min_segundos: i32,
    pub delay_max_segundos: i32,
    pub delay_mensagem_segundos: i32,
    pub mensagem_padrao: String,
    pub instancia_whatsapp: String,
    pub configuracao: serde_json::Value,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
    pub agendado_para: Option<DateTime<Utc>>,
}

impl Campanha {
    pub fn status_campanha(&self) -> StatusCampanha {
        self.status.parse().unwrap_or(StatusCampanha::Rascunho)
    }
}

/// Arquivo anexado a uma campanha, já em base64 para o payload de despacho.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArquivoAnexo {
    pub nome: String,
    pub mimetype: String,
    pub conteudo_base64: String,
}

/// Requisição de criação de campanha (formulário completo).
#[derive(Debug, Clone, Deserialize)]
pub struct NovaCampanhaRequest {
    pub usuario_id: Uuid,
    pub cliente_id: Option<Uuid>,
    pub pasta_id: Option<Uuid>,
    pub pasta_nome: Option<String>,
    pub tipo_campanha: Option<TipoCampanha>,
    #[serde(default)]
    pub nome_campanha: String,
    #[serde(default = "default_delay_min")]
    pub delay_min_segundos: i32,
    #[serde(default = "default_delay_max")]
    pub delay_max_segundos: i32,
    #[serde(default = "default_delay_mensagem")]
    pub delay_mensagem_segundos: i32,
    #[serde(default)]
    pub mensagem_padrao: String,
    /// Instâncias selecionadas: exatamente 1 para simples/ia, 2+ para multi_ia
    #[serde(default)]
    pub instancias: Vec<String>,
    #[serde(default)]
    pub leads: Vec<LeadSelecionado>,
    pub arquivo: Option<ArquivoAnexo>,
    pub agendado_para: Option<DateTime<Utc>>,
}

fn default_delay_min() -> i32 {
    30
}

fn default_delay_max() -> i32 {
    90
}

fn default_delay_mensagem() -> i32 {
    5
}

/// Edição de campanha: apenas nome, delays e mensagem. Status e leads nunca
/// passam por aqui.
#[derive(Debug, Clone, Deserialize)]
pub struct EdicaoCampanha {
    pub nome_campanha: Option<String>,
    pub delay_min_segundos: Option<i32>,
    pub delay_max_segundos: Option<i32>,
    pub delay_mensagem_segundos: Option<i32>,
    pub mensagem_padrao: Option<String>,
    /// `None` mantém o agendamento atual; a edição substitui a data mas
    /// nunca a limpa. Desagendar é iniciar a campanha.
    pub agendado_para: Option<DateTime<Utc>>,
}

/// Nome da campanha duplicada.
pub fn nome_copia(nome: &str) -> String {
    format!("{} (Cópia)", nome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            StatusCampanha::Rascunho,
            StatusCampanha::Agendado,
            StatusCampanha::EmAndamento,
            StatusCampanha::Pausado,
            StatusCampanha::Concluido,
            StatusCampanha::Cancelado,
            StatusCampanha::Erro,
        ] {
            let parsed: StatusCampanha = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_terminal() {
        assert!(StatusCampanha::Concluido.terminal());
        assert!(StatusCampanha::Cancelado.terminal());
        assert!(StatusCampanha::Erro.terminal());
        assert!(!StatusCampanha::EmAndamento.terminal());
        assert!(!StatusCampanha::Pausado.terminal());
    }

    #[test]
    fn test_nome_copia() {
        assert_eq!(nome_copia("Black Friday"), "Black Friday (Cópia)");
    }

    #[test]
    fn test_requisicao_com_defaults() {
        let req: NovaCampanhaRequest = serde_json::from_value(serde_json::json!({
            "usuario_id": "7b2a8c1e-9f34-4f10-9a21-3d5c2e8b0a11",
            "tipo_campanha": "simples",
            "nome_campanha": "Teste",
            "instancias": ["vendas-01"],
            "leads": []
        }))
        .unwrap();

        assert_eq!(req.delay_min_segundos, 30);
        assert_eq!(req.delay_max_segundos, 90);
        assert_eq!(req.delay_mensagem_segundos, 5);
        assert_eq!(req.tipo_campanha, Some(TipoCampanha::Simples));
    }
}
