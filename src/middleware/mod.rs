/// Middleware layer para o Axum router
///
/// Autenticação dos endpoints administrativos (inspeção do outbox).
pub mod admin_auth;

pub use admin_auth::require_admin_key;
