use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Status de entrega de um lead dentro de uma campanha.
///
/// Nasce `pendente` na distribuição; só o motor de disparo externo muda para
/// `enviado` ou `falhou`, via webhook de status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusDisparo {
    Pendente,
    Enviado,
    Falhou,
}

impl std::fmt::Display for StatusDisparo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StatusDisparo::Pendente => "pendente",
            StatusDisparo::Enviado => "enviado",
            StatusDisparo::Falhou => "falhou",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for StatusDisparo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendente" => Ok(StatusDisparo::Pendente),
            "enviado" => Ok(StatusDisparo::Enviado),
            "falhou" => Ok(StatusDisparo::Falhou),
            other => Err(format!("status de disparo desconhecido: {}", other)),
        }
    }
}

/// Lead selecionado no formulário de criação (snapshot, não referência viva).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadSelecionado {
    pub id: Uuid,
    pub nome: String,
    pub telefone: String,
    pub empresa: Option<String>,
    pub site: Option<String>,
}

/// Linha da tabela `disparo_leads`: um registro por (campanha, lead).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DisparoLead {
    pub id: Uuid,
    pub campanha_id: Uuid,
    pub lead_id: Uuid,
    pub nome_lead: String,
    pub telefone: String,
    pub empresa: Option<String>,
    pub site: Option<String>,
    pub status: String,
    pub atualizado_em: DateTime<Utc>,
}

/// Dados de inserção de um registro de disparo (id e timestamps ficam com o
/// banco).
#[derive(Debug, Clone)]
pub struct NovoDisparoLead {
    pub lead_id: Uuid,
    pub nome_lead: String,
    pub telefone: String,
    pub empresa: Option<String>,
    pub site: Option<String>,
}

impl NovoDisparoLead {
    pub fn do_lead(lead: &LeadSelecionado) -> Self {
        Self {
            lead_id: lead.id,
            nome_lead: lead.nome.clone(),
            telefone: crate::utils::normalizar_telefone(&lead.telefone),
            empresa: lead.empresa.clone(),
            site: lead.site.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_normaliza_telefone() {
        let lead = LeadSelecionado {
            id: Uuid::new_v4(),
            nome: "Maria".to_string(),
            telefone: "(11) 98888-0001".to_string(),
            empresa: Some("ACME".to_string()),
            site: None,
        };

        let novo = NovoDisparoLead::do_lead(&lead);
        assert_eq!(novo.telefone, "5511988880001");
        assert_eq!(novo.nome_lead, "Maria");
    }

    #[test]
    fn test_status_disparo_roundtrip() {
        for status in [
            StatusDisparo::Pendente,
            StatusDisparo::Enviado,
            StatusDisparo::Falhou,
        ] {
            let parsed: StatusDisparo = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }
}
