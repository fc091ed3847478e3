use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::campanha::StatusCampanha;
use crate::models::lead::StatusDisparo;

/// Relatório por lead: o motor de disparo informa o resultado de um envio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatorioLead {
    pub campanha_id: Uuid,
    pub lead_id: Uuid,
    pub status: StatusDisparo,
}

/// Relatório de campanha: o motor encerra ou marca erro na campanha inteira.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatorioCampanha {
    pub campanha_id: Uuid,
    pub evento: StatusCampanha,
}

/// Payload do webhook de status. O motor de disparo envia dois formatos no
/// mesmo endpoint; o parse é flexível, como nos demais webhooks da casa.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelatorioDisparo {
    Lead(RelatorioLead),
    Campanha(RelatorioCampanha),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_relatorio_de_lead() {
        let json = serde_json::json!({
            "campanha_id": "7b2a8c1e-9f34-4f10-9a21-3d5c2e8b0a11",
            "lead_id": "0e6f3a92-1c2b-4d5e-8f70-6a1b2c3d4e5f",
            "status": "enviado"
        });

        match serde_json::from_value::<RelatorioDisparo>(json).unwrap() {
            RelatorioDisparo::Lead(r) => assert_eq!(r.status, StatusDisparo::Enviado),
            other => panic!("esperava relatório de lead, veio {:?}", other),
        }
    }

    #[test]
    fn test_parse_relatorio_de_campanha() {
        let json = serde_json::json!({
            "campanha_id": "7b2a8c1e-9f34-4f10-9a21-3d5c2e8b0a11",
            "evento": "concluido"
        });

        match serde_json::from_value::<RelatorioDisparo>(json).unwrap() {
            RelatorioDisparo::Campanha(r) => {
                assert_eq!(r.evento, StatusCampanha::Concluido)
            }
            other => panic!("esperava relatório de campanha, veio {:?}", other),
        }
    }

    #[test]
    fn test_payload_invalido() {
        let json = serde_json::json!({ "qualquer": "coisa" });
        assert!(serde_json::from_value::<RelatorioDisparo>(json).is_err());
    }
}
