pub mod cli;
pub mod cloud;
pub mod config;
pub mod error;
pub mod k8s;
pub mod metrics;
pub mod provider;

pub use error::{CrdHostError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
