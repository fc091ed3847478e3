pub mod campanha;
pub mod lead;
pub mod progresso;
pub mod relatorio;

pub use campanha::*;
pub use lead::*;
pub use progresso::*;
pub use relatorio::*;
