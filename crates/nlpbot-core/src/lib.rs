pub mod config;
pub mod error;
pub mod types;

pub use config::NlpbotConfig;
pub use error::{NlpbotError, Result};
pub use types::*;
