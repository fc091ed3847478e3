/// Disparos middleware: ciclo de vida de campanhas de disparo WhatsApp.
///
/// Arquitetura:
/// - Criação valida o formulário, persiste a campanha, distribui os registros
///   de disparo em lotes e despacha o payload para o motor externo (n8n)
/// - O motor executa os envios e reporta resultado por lead no webhook de
///   status
/// - Um rastreador único de progresso alimenta o monitor e a lista de
///   disparos a partir do mesmo agregado
/// - Notificações de início saem por um outbox drenado com retry
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use disparos_middleware::{
    config::Settings, handlers, middleware as app_middleware, services, utils, AppState,
};

use handlers::{
    atualizar_monitor, criar_campanha, duplicar_campanha, editar_campanha, excluir_campanha,
    handle_relatorio_disparo, health_check, iniciar_campanha, listar_campanhas,
    listar_leads_campanha, listar_outbox, obter_campanha, obter_monitor, pausar_campanha,
    ready_check, status_check,
};
use utils::logging::*;
use utils::AppError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Carregar variáveis de ambiente do arquivo .env (se existir)
    if dotenvy::dotenv().is_err() {
        // Em produção não existe .env - variáveis vêm do ambiente
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    // Inicializar tracing
    tracing_subscriber::fmt::init();

    // Carregar configurações
    let settings = Settings::new()
        .map_err(|e| AppError::ConfigError(format!("Failed to load settings: {}", e)))?;

    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    // Conectar ao banco e aplicar migrações
    let pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&settings.database.url)
        .await
        .map_err(|e| AppError::ConfigError(format!("Failed to connect to database: {}", e)))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::ConfigError(format!("Failed to run migrations: {}", e)))?;

    log_info("✅ Banco conectado e migrações aplicadas");

    // Inicializar serviços
    let store = services::CampaignStore::new(pool);

    let gateway = whatsapp::GatewayClient::new(
        settings.gateway.base_url.clone(),
        settings.gateway.api_token.clone(),
    );

    let dispatch = services::DispatchService::new(
        settings.dispatch.webhook_url.clone(),
        settings.dispatch.backend_url.clone(),
    );

    let creator =
        services::CampaignCreator::new(store.clone(), dispatch.clone(), gateway.clone());

    // Rastreador único de progresso: um timer para todas as superfícies
    let tracker = Arc::new(services::ProgressTracker::new(
        store.clone(),
        settings.monitor.intervalo_segundos,
        settings.monitor.max_campanhas,
    ));
    tracker.clone().start_scheduler();

    // Despachante do outbox de notificações de início
    let outbox = Arc::new(services::OutboxDispatcher::new(
        store.clone(),
        dispatch.clone(),
        settings.outbox.intervalo_segundos,
        settings.outbox.max_tentativas,
    ));
    outbox.start_scheduler();

    // Estado da aplicação
    let app_state = Arc::new(AppState {
        settings: settings.clone(),
        store,
        creator,
        dispatch,
        gateway,
        tracker,
    });

    // Configurar rotas base
    let mut app = Router::new()
        // Health checks (públicos)
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/status", get(status_check))
        // Webhook de status do motor de disparo (validação própria por HMAC)
        .route("/webhooks/disparo", post(handle_relatorio_disparo))
        // Criação e gestão de campanhas
        .route("/api/campanhas", get(listar_campanhas).post(criar_campanha))
        .route(
            "/api/campanhas/:id",
            get(obter_campanha)
                .patch(editar_campanha)
                .delete(excluir_campanha),
        )
        .route("/api/campanhas/:id/leads", get(listar_leads_campanha))
        .route("/api/campanhas/:id/iniciar", post(iniciar_campanha))
        .route("/api/campanhas/:id/pausar", post(pausar_campanha))
        .route("/api/campanhas/:id/duplicar", post(duplicar_campanha))
        // Monitor de progresso
        .route("/api/monitor", get(obter_monitor))
        .route("/api/monitor/refresh", post(atualizar_monitor))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state.clone());

    // Rotas administrativas protegidas com API key
    let admin_routes = Router::new()
        .route("/admin/outbox", get(listar_outbox))
        .layer(middleware::from_fn(app_middleware::require_admin_key))
        .with_state(app_state);

    app = app.merge(admin_routes);

    // Iniciar servidor (PORT do ambiente tem precedência, como no Cloud Run)
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(settings.server.port);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    log_server_startup(port);
    log_server_ready(port);

    // Graceful shutdown com signal handling
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info("🛑 Server shut down gracefully");
    Ok(())
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
