use tracing::{debug, error, info, warn};

pub fn log_request_received(endpoint: &str, method: &str) {
    info!("Request received: {} {}", method, endpoint);
}

pub fn log_request_processed(endpoint: &str, status: u16, duration_ms: u64) {
    info!("Request processed: {} - Status: {} - Duration: {}ms",
          endpoint, status, duration_ms);
}

pub fn log_campanha_criada(campanha_id: &str, nome: &str, total_leads: usize) {
    info!("Campanha criada: {} - Nome: {} - Leads: {}", campanha_id, nome, total_leads);
}

pub fn log_despacho_enviado(campanha_id: &str, webhook_url: &str) {
    info!("📤 Campanha {} despachada para o motor de envio: {}", campanha_id, webhook_url);
}

pub fn log_despacho_erro(campanha_id: &str, error: &str) {
    error!("❌ Falha no despacho da campanha {}: {}", campanha_id, error);
}

pub fn log_status_campanha(campanha_id: &str, status: &str) {
    info!("Campanha {} - status atualizado para '{}'", campanha_id, status);
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_server_startup(port: u16) {
    info!("🚀 Disparos middleware server starting on port {}", port);
}

pub fn log_server_ready(port: u16) {
    info!("✅ Server ready and listening on http://0.0.0.0:{}", port);
}

pub fn log_health_check() {
    debug!("Health check requested");
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}
