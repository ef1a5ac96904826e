//! Application layer - orchestrates use cases and coordinates between domains

pub mod commands;
pub mod errors;
pub mod generate_server;
pub mod session;
pub mod traits;

pub use commands::*;
pub use errors::*;
pub use generate_server::GenerateServerUseCase;
pub use session::{LoadSummary, Session, SessionState};
pub use traits::*;
