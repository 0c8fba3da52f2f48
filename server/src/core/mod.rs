//! Core application infrastructure
//!
//! - `config` - Environment-driven configuration
//! - `constants` - Application-wide constants and env var names
//! - `cli` - Command line interface
//! - `shutdown` - Graceful shutdown coordination

pub mod cli;
pub mod config;
pub mod constants;
pub mod shutdown;

pub use crate::app::CoreApp;
pub use cli::{CliConfig, Commands};
pub use config::{AppConfig, ServerConfig, TtlConfig};
pub use shutdown::ShutdownService;
