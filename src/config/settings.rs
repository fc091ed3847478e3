use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub dispatch: DispatchSettings,
    pub gateway: GatewaySettings,
    pub monitor: MonitorSettings,
    pub outbox: OutboxSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DispatchSettings {
    /// Webhook do motor de disparo externo (n8n) que executa o envio
    pub webhook_url: String,
    /// Backend notificado quando uma campanha é iniciada manualmente
    pub backend_url: String,
    /// Segredo HMAC dos webhooks de status recebidos do motor de disparo
    pub webhook_secret: Option<String>,
    pub validate_signature: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    pub api_token: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorSettings {
    /// Intervalo único do rastreador de progresso (substitui os timers
    /// independentes de 3s e 60s das telas originais)
    pub intervalo_segundos: u64,
    /// Quantas campanhas recentes entram no snapshot do monitor
    pub max_campanhas: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutboxSettings {
    pub intervalo_segundos: u64,
    pub max_tentativas: i32,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Variáveis de ambiente específicas
        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }
        if let Ok(url) = std::env::var("DISPARO_WEBHOOK_URL") {
            builder = builder.set_override("dispatch.webhook_url", url)?;
        }
        if let Ok(url) = std::env::var("DISPARO_BACKEND_URL") {
            builder = builder.set_override("dispatch.backend_url", url)?;
        }
        if let Ok(secret) = std::env::var("DISPARO_WEBHOOK_SECRET") {
            builder = builder.set_override("dispatch.webhook_secret", secret)?;
        }
        if let Ok(token) = std::env::var("GATEWAY_API_TOKEN") {
            builder = builder.set_override("gateway.api_token", token)?;
        }
        if let Ok(url) = std::env::var("GATEWAY_BASE_URL") {
            builder = builder.set_override("gateway.base_url", url)?;
        }

        // Prefixo genérico (ex.: DISPAROS__SERVER__PORT)
        builder = builder.add_source(Environment::with_prefix("DISPAROS").separator("__"));

        let s = builder.build()?;

        s.try_deserialize()
    }
}
