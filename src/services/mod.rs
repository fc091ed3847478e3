pub mod creator;
pub mod dispatch;
pub mod outbox;
pub mod store;
pub mod tracker;

pub use creator::{CampaignCreator, RespostaCriacao};
pub use dispatch::DispatchService;
pub use outbox::OutboxDispatcher;
pub use store::{CampaignStore, NovaCampanha, OutboxEvento, TAMANHO_LOTE};
pub use tracker::{ProgressTracker, ProgressoMonitor};
