pub mod error;
pub mod logging;
pub mod telefone;

pub use error::*;
pub use telefone::normalizar_telefone;
