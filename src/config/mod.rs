pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, validate_url, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "certgen")]
#[command(about = "Batch-generate personalized PDF certificates from a CSV roster")]
pub struct CliConfig {
    /// Roster CSV with student name, course and date columns
    #[arg(long)]
    pub csv: String,

    /// Background image applied to every certificate
    #[arg(long)]
    pub background: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Host the frontend is served from; loopback hosts select the local
    /// development backend
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Explicit backend base URL, bypassing host-based resolution
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Also bundle the generated PDFs into certificates.zip
    #[arg(long)]
    pub bundle: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log system stats during the run")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn roster_path(&self) -> &str {
        &self.csv
    }

    fn background_path(&self) -> &str {
        &self.background
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn serving_host(&self) -> &str {
        &self.host
    }

    fn endpoint_override(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn bundle_enabled(&self) -> bool {
        self.bundle
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("csv", &self.csv)?;
        validate_path("background", &self.background)?;
        validate_path("output_path", &self.output_path)?;

        if let Some(endpoint) = &self.endpoint {
            validate_url("endpoint", endpoint)?;
        }

        Ok(())
    }
}
