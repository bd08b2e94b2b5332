pub mod config;
pub mod error;
pub mod types;

pub use config::DeployConfig;
pub use error::{Error, Result};
pub use types::*;
