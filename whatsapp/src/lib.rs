//! Cliente do gateway WhatsApp.
//!
//! O middleware não envia mensagens diretamente: o envio é feito pelo motor
//! de disparo externo. Este crate cobre a parte que o middleware precisa
//! conhecer do gateway: quais instâncias existem, seus tokens e se a sessão
//! está conectada no momento da criação de uma campanha.

use serde::{Deserialize, Serialize};

/// Erros do cliente do gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway API error: status {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Instância '{0}' não encontrada no gateway")]
    InstanceNotFound(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Uma instância (sessão WhatsApp) registrada no gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanciaInfo {
    pub instance: String,
    pub token: String,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Estado da sessão reportado pelo gateway ("open", "connecting", "close"...)
    #[serde(default)]
    pub state: Option<String>,
}

impl InstanciaInfo {
    /// Sessão pronta para uso em um disparo.
    pub fn conectada(&self) -> bool {
        matches!(self.state.as_deref(), Some("open") | Some("connected"))
    }
}

#[derive(Debug, Deserialize)]
struct FetchInstancesResponse {
    instances: Vec<InstanciaInfo>,
}

/// Cliente HTTP do gateway WhatsApp.
#[derive(Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl GatewayClient {
    pub fn new(base_url: String, api_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    /// Lista todas as instâncias registradas no gateway.
    pub async fn listar_instancias(&self) -> GatewayResult<Vec<InstanciaInfo>> {
        let url = format!("{}/instance/fetchInstances", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: FetchInstancesResponse = response.json().await?;
        tracing::debug!("Gateway retornou {} instâncias", parsed.instances.len());

        Ok(parsed.instances)
    }

    /// Busca uma instância pelo nome.
    pub async fn buscar_instancia(&self, nome: &str) -> GatewayResult<InstanciaInfo> {
        let instancias = self.listar_instancias().await?;

        instancias
            .into_iter()
            .find(|i| i.instance == nome)
            .ok_or_else(|| GatewayError::InstanceNotFound(nome.to_string()))
    }

    /// Verifica o estado de conexão de uma instância pelo endpoint dedicado.
    pub async fn estado_conexao(&self, nome: &str) -> GatewayResult<Option<String>> {
        let url = format!(
            "{}/instance/connectionState/{}",
            self.base_url,
            urlencoding::encode(nome)
        );

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        Ok(body
            .get("state")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_instancia_conectada() {
        let mut info = InstanciaInfo {
            instance: "vendas-01".to_string(),
            token: "tok".to_string(),
            profile_name: None,
            phone_number: None,
            state: Some("open".to_string()),
        };
        assert!(info.conectada());

        info.state = Some("close".to_string());
        assert!(!info.conectada());

        info.state = None;
        assert!(!info.conectada());
    }

    #[tokio::test]
    async fn test_listar_instancias() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/instance/fetchInstances")
                .header("apikey", "secret");
            then.status(200).json_body(serde_json::json!({
                "instances": [
                    {
                        "instance": "vendas-01",
                        "token": "tok-1",
                        "profile_name": "Equipe Vendas",
                        "phone_number": "5511999990001",
                        "state": "open"
                    },
                    {
                        "instance": "vendas-02",
                        "token": "tok-2",
                        "state": "close"
                    }
                ]
            }));
        });

        let client = GatewayClient::new(server.base_url(), "secret".to_string());
        let instancias = client.listar_instancias().await.unwrap();

        mock.assert();
        assert_eq!(instancias.len(), 2);
        assert!(instancias[0].conectada());
        assert!(!instancias[1].conectada());
        assert_eq!(instancias[0].phone_number.as_deref(), Some("5511999990001"));
    }

    #[tokio::test]
    async fn test_buscar_instancia_nao_encontrada() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/instance/fetchInstances");
            then.status(200)
                .json_body(serde_json::json!({ "instances": [] }));
        });

        let client = GatewayClient::new(server.base_url(), "secret".to_string());
        let err = client.buscar_instancia("inexistente").await.unwrap_err();

        assert!(matches!(err, GatewayError::InstanceNotFound(_)));
    }

    #[tokio::test]
    async fn test_estado_conexao() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/instance/connectionState/vendas-01")
                .header("apikey", "secret");
            then.status(200)
                .json_body(serde_json::json!({ "state": "open" }));
        });

        let client = GatewayClient::new(server.base_url(), "secret".to_string());
        let estado = client.estado_conexao("vendas-01").await.unwrap();

        mock.assert();
        assert_eq!(estado.as_deref(), Some("open"));
    }

    #[tokio::test]
    async fn test_estado_conexao_sem_campo_state() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/instance/connectionState/vendas-01");
            then.status(200).json_body(serde_json::json!({}));
        });

        let client = GatewayClient::new(server.base_url(), "secret".to_string());
        let estado = client.estado_conexao("vendas-01").await.unwrap();

        assert!(estado.is_none());
    }

    #[tokio::test]
    async fn test_erro_de_api() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/instance/fetchInstances");
            then.status(401).body("unauthorized");
        });

        let client = GatewayClient::new(server.base_url(), "errado".to_string());
        let err = client.listar_instancias().await.unwrap_err();

        match err {
            GatewayError::Api { status, .. } => assert_eq!(status, 401),
            other => panic!("esperava erro de API, veio {:?}", other),
        }
    }
}
