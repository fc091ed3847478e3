// Biblioteca do disparos-middleware
// Expõe módulos para uso em testes e binários

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

// AppState é definido aqui para ser compartilhado
#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub store: services::CampaignStore,
    pub creator: services::CampaignCreator,
    pub dispatch: services::DispatchService,
    pub gateway: whatsapp::GatewayClient,
    pub tracker: Arc<services::ProgressTracker>,
}
