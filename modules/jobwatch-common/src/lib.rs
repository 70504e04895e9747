pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{JobWatchError, Result};
pub use types::*;
