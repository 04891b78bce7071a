use crate::core::pipeline::resolve_backend_base;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CertError, Result};
use crate::utils::validation::{validate_path, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub project: ProjectConfig,
    pub inputs: InputsConfig,
    pub backend: Option<BackendConfig>,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    pub csv: String,
    pub background: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Host the frontend is served from (drives base resolution)
    pub host: Option<String>,
    /// Explicit base URL, bypassing resolution
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub bundle: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CertError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CertError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${BACKEND_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// The base the render stage will use, shown in config summaries.
    pub fn resolved_backend_base(&self) -> String {
        match self.endpoint_override() {
            Some(endpoint) => endpoint.to_string(),
            None => resolve_backend_base(self.serving_host()).to_string(),
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn roster_path(&self) -> &str {
        &self.inputs.csv
    }

    fn background_path(&self) -> &str {
        &self.inputs.background
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn serving_host(&self) -> &str {
        self.backend
            .as_ref()
            .and_then(|b| b.host.as_deref())
            .unwrap_or("localhost")
    }

    fn endpoint_override(&self) -> Option<&str> {
        self.backend.as_ref().and_then(|b| b.endpoint.as_deref())
    }

    fn bundle_enabled(&self) -> bool {
        self.output.bundle.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_path("inputs.csv", &self.inputs.csv)?;
        validate_path("inputs.background", &self.inputs.background)?;
        validate_path("output.path", &self.output.path)?;

        if let Some(endpoint) = self.endpoint_override() {
            validate_url("backend.endpoint", endpoint)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[project]
name = "spring-cohort"
description = "Spring 2024 completion certificates"

[inputs]
csv = "roster.csv"
background = "bg.png"

[backend]
host = "certificates.example.com"

[output]
path = "./output"
bundle = true

[monitoring]
enabled = true
"#;

    #[test]
    fn parses_a_full_config() {
        let config = TomlConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.project.name, "spring-cohort");
        assert_eq!(config.roster_path(), "roster.csv");
        assert_eq!(config.background_path(), "bg.png");
        assert_eq!(config.serving_host(), "certificates.example.com");
        assert!(config.bundle_enabled());
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn omitted_sections_fall_back_to_defaults() {
        let minimal = r#"
[project]
name = "minimal"

[inputs]
csv = "roster.csv"
background = "bg.png"

[output]
path = "./output"
"#;
        let config = TomlConfig::from_toml_str(minimal).unwrap();

        assert_eq!(config.serving_host(), "localhost");
        assert!(config.endpoint_override().is_none());
        assert!(!config.bundle_enabled());
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn a_loopback_host_resolves_to_the_development_backend() {
        let minimal = r#"
[project]
name = "minimal"

[inputs]
csv = "roster.csv"
background = "bg.png"

[output]
path = "./output"
"#;
        let config = TomlConfig::from_toml_str(minimal).unwrap();
        assert_eq!(
            config.resolved_backend_base(),
            crate::core::pipeline::LOCAL_BASE
        );
    }

    #[test]
    fn substitutes_environment_variables() {
        std::env::set_var("CERTGEN_TEST_ENDPOINT", "http://localhost:9999");

        let content = r#"
[project]
name = "env"

[inputs]
csv = "roster.csv"
background = "bg.png"

[backend]
endpoint = "${CERTGEN_TEST_ENDPOINT}"

[output]
path = "./output"
"#;
        let config = TomlConfig::from_toml_str(content).unwrap();

        assert_eq!(config.endpoint_override(), Some("http://localhost:9999"));
        assert_eq!(config.resolved_backend_base(), "http://localhost:9999");
    }

    #[test]
    fn unknown_variables_are_left_in_place() {
        let content = "name = \"${CERTGEN_TEST_DOES_NOT_EXIST}\"";
        let processed = TomlConfig::substitute_env_vars(content).unwrap();
        assert!(processed.contains("${CERTGEN_TEST_DOES_NOT_EXIST}"));
    }

    #[test]
    fn validation_rejects_a_malformed_endpoint() {
        let content = r#"
[project]
name = "bad"

[inputs]
csv = "roster.csv"
background = "bg.png"

[backend]
endpoint = "not a url"

[output]
path = "./output"
"#;
        let config = TomlConfig::from_toml_str(content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CertError::InvalidConfigValueError { .. })
        ));
    }
}
