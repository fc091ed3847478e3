pub mod admin;
pub mod campanhas;
pub mod health;
pub mod monitor;
pub mod webhook;

pub use admin::*;
pub use campanhas::*;
pub use health::*;
pub use monitor::*;
pub use webhook::*;
