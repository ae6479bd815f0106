pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::http::{DEFAULT_AUTH_URL, DEFAULT_COMPONENTS_URL, DEFAULT_ENTITLEMENTS_URL};
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_positive_number,
    validate_required_field, validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::Deserialize;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "cli")]
use std::time::Duration;

pub const DEFAULT_IDENTIFIER_COLUMN: &str = "Serial Number";
pub const TABLE_EXTENSIONS: [&str; 2] = ["csv", "tsv"];

/// Credential value that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl FromStr for Secret {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "tag-enrich")]
#[command(about = "Enrich a table of service tags with warranty and storage data")]
pub struct CliConfig {
    #[arg(short, long, default_value = "input.csv", help = "Input table (.csv or .tsv)")]
    pub input: String,

    #[arg(short, long, default_value = "output.csv", help = "Output table, overwritten")]
    pub output: String,

    #[arg(long, default_value = DEFAULT_IDENTIFIER_COLUMN)]
    pub identifier_column: String,

    #[arg(long, env = "DELL_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, env = "DELL_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<Secret>,

    #[arg(long, default_value = DEFAULT_AUTH_URL)]
    pub auth_url: String,

    #[arg(long, default_value = DEFAULT_ENTITLEMENTS_URL)]
    pub entitlements_url: String,

    #[arg(long, default_value = DEFAULT_COMPONENTS_URL)]
    pub components_url: String,

    #[arg(long, help = "Per-request timeout; transport default when omitted")]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage after each phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn identifier_column(&self) -> &str {
        &self.identifier_column
    }

    fn auth_url(&self) -> &str {
        &self.auth_url
    }

    fn entitlements_url(&self) -> &str {
        &self.entitlements_url
    }

    fn components_url(&self) -> &str {
        &self.components_url
    }

    fn client_id(&self) -> &str {
        self.client_id.as_deref().unwrap_or_default()
    }

    fn client_secret(&self) -> &str {
        self.client_secret
            .as_ref()
            .map(Secret::expose)
            .unwrap_or_default()
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_file_extension("input", &self.input, &TABLE_EXTENSIONS)?;
        validate_path("output", &self.output)?;
        validate_file_extension("output", &self.output, &TABLE_EXTENSIONS)?;
        validate_non_empty_string("identifier_column", &self.identifier_column)?;

        validate_url("auth_url", &self.auth_url)?;
        validate_url("entitlements_url", &self.entitlements_url)?;
        validate_url("components_url", &self.components_url)?;

        let client_id = validate_required_field("client_id", &self.client_id)?;
        validate_non_empty_string("client_id", client_id)?;
        let client_secret = validate_required_field("client_secret", &self.client_secret)?;
        validate_non_empty_string("client_secret", client_secret.expose())?;

        if let Some(timeout) = self.timeout_seconds {
            validate_positive_number("timeout_seconds", timeout, 1)?;
        }

        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["tag-enrich"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--client-id", "id", "--client-secret", "secret"]);
        assert_eq!(config.input_path(), "input.csv");
        assert_eq!(config.output_path(), "output.csv");
        assert_eq!(config.identifier_column(), "Serial Number");
        assert_eq!(config.auth_url(), DEFAULT_AUTH_URL);
        assert!(config.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "-i",
            "fleet.tsv",
            "-o",
            "out/fleet.csv",
            "--identifier-column",
            "Service Tag",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--timeout-seconds",
            "30",
        ]);
        assert_eq!(config.input_path(), "fleet.tsv");
        assert_eq!(config.identifier_column(), "Service Tag");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secret_is_not_in_debug_output() {
        let config = parse(&["--client-id", "id", "--client-secret", "hunter2"]);
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert_eq!(config.client_secret(), "hunter2");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = parse(&["--client-id", "id", "--client-secret", "secret"]);
        config.input = "assets.xlsx".to_string();
        assert!(config.validate().is_err());

        let mut config = parse(&["--client-id", "id", "--client-secret", "secret"]);
        config.timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        let mut config = parse(&["--client-id", "id", "--client-secret", "secret"]);
        config.entitlements_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_requires_credentials() {
        let mut config = parse(&["--client-id", "id", "--client-secret", "secret"]);
        config.client_secret = None;
        assert!(matches!(
            config.validate(),
            Err(EtlError::MissingConfigError { field }) if field == "client_secret"
        ));
    }
}
