use crate::config::toml_config::TomlConfig;
use crate::config::ShipmentConfig;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "shipment-times")]
#[command(about = "Convert a BASE order export into Click Post labels and packing summaries")]
pub struct CliConfig {
    /// Shift-JIS order export downloaded from the shop admin
    pub input: PathBuf,

    /// Directory that receives the dated output folder
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Orders with a total quantity above this go to the summary file
    #[arg(long)]
    pub threshold: Option<u64>,

    /// "win" writes Shift-JIS with CRLF; anything else writes UTF-8
    #[arg(long)]
    pub target_os: Option<String>,

    /// TOML configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Loads the config file (if any) and applies command-line overrides.
    pub fn resolve(&self) -> Result<ShipmentConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?.shipment_config(),
            None => ShipmentConfig::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.output_path = dir.clone();
        }
        if let Some(threshold) = self.threshold {
            config.quantity_threshold = threshold;
        }
        if let Some(target_os) = &self.target_os {
            config.target_os = target_os.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input.to_string_lossy())?;
        if let Some(dir) = &self.output_dir {
            validation::validate_path("output_dir", dir)?;
        }
        Ok(())
    }
}
