use crate::adapters::http::{DEFAULT_AUTH_URL, DEFAULT_COMPONENTS_URL, DEFAULT_ENTITLEMENTS_URL};
use crate::config::{Secret, DEFAULT_IDENTIFIER_COLUMN, TABLE_EXTENSIONS};
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_positive_number,
    validate_url, Validate,
};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    pub io: IoConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IoConfig {
    pub input_path: String,
    pub output_path: String,
    #[serde(default = "default_identifier_column")]
    pub identifier_column: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_entitlements_url")]
    pub entitlements_url: String,
    #[serde(default = "default_components_url")]
    pub components_url: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            entitlements_url: default_entitlements_url(),
            components_url: default_components_url(),
            timeout_seconds: None,
        }
    }
}

/// 通常以 `${DELL_CLIENT_ID}` 形式引用環境變數
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    pub client_id: String,
    pub client_secret: Secret,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub json_logs: bool,
}

fn default_identifier_column() -> String {
    DEFAULT_IDENTIFIER_COLUMN.to_string()
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_entitlements_url() -> String {
    DEFAULT_ENTITLEMENTS_URL.to_string()
}

fn default_components_url() -> String {
    DEFAULT_COMPONENTS_URL.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DELL_CLIENT_SECRET})；未設定的變數視為錯誤
    fn substitute_env_vars(content: &str) -> Result<String> {
        let missing: Vec<String> = ENV_VAR_RE
            .captures_iter(content)
            .map(|caps| caps[1].to_string())
            .filter(|name| std::env::var(name).is_err())
            .collect();

        if !missing.is_empty() {
            return Err(EtlError::ConfigValidationError {
                field: "environment".to_string(),
                message: format!("Unset environment variables: {}", missing.join(", ")),
            });
        }

        let result = ENV_VAR_RE.replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        Ok(result.into_owned())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.io.input_path
    }

    fn output_path(&self) -> &str {
        &self.io.output_path
    }

    fn identifier_column(&self) -> &str {
        &self.io.identifier_column
    }

    fn auth_url(&self) -> &str {
        &self.api.auth_url
    }

    fn entitlements_url(&self) -> &str {
        &self.api.entitlements_url
    }

    fn components_url(&self) -> &str {
        &self.api.components_url
    }

    fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    fn client_secret(&self) -> &str {
        self.credentials.client_secret.expose()
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.api.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_path("io.input_path", &self.io.input_path)?;
        validate_file_extension("io.input_path", &self.io.input_path, &TABLE_EXTENSIONS)?;
        validate_path("io.output_path", &self.io.output_path)?;
        validate_file_extension("io.output_path", &self.io.output_path, &TABLE_EXTENSIONS)?;
        validate_non_empty_string("io.identifier_column", &self.io.identifier_column)?;

        validate_url("api.auth_url", &self.api.auth_url)?;
        validate_url("api.entitlements_url", &self.api.entitlements_url)?;
        validate_url("api.components_url", &self.api.components_url)?;
        if let Some(timeout) = self.api.timeout_seconds {
            validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }

        validate_non_empty_string("credentials.client_id", &self.credentials.client_id)?;
        validate_non_empty_string(
            "credentials.client_secret",
            self.credentials.client_secret.expose(),
        )?;

        Ok(())
    }
}
