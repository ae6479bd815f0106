pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use adapters::DellApiClient;
pub use core::{
    etl::{EtlEngine, RunReport},
    pipeline::EnrichmentPipeline,
};
pub use utils::error::{EtlError, Result};
