pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use crate::core::{engine::GenerationEngine, pipeline::CertificatePipeline, session::Session};
pub use utils::error::{CertError, Result};
