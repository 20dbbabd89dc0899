pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
#[cfg(feature = "server")]
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::storage::LocalStorage;
pub use config::{toml_config::TomlConfig, ShipmentConfig};
pub use crate::core::{etl::EtlEngine, pipeline::ShipmentPipeline};
pub use domain::model::{LineItem, Order, OutputReport, RawRow};
pub use utils::error::{Result, ShipmentError};
