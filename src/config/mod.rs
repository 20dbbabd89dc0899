#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::splitter::DEFAULT_QUANTITY_THRESHOLD;
use crate::core::ConfigProvider;
use crate::domain::model::OutputFiles;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTPUT_PATH: &str = "output";
pub const DEFAULT_TARGET_OS: &str = "win";

/// Settings for one export run, after merging the config file and flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentConfig {
    pub output_path: String,
    pub quantity_threshold: u64,
    pub target_os: String,
    pub output_files: OutputFiles,
}

impl Default for ShipmentConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            quantity_threshold: DEFAULT_QUANTITY_THRESHOLD,
            target_os: DEFAULT_TARGET_OS.to_string(),
            output_files: OutputFiles::default(),
        }
    }
}

impl ConfigProvider for ShipmentConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn quantity_threshold(&self) -> u64 {
        self.quantity_threshold
    }

    fn target_os(&self) -> &str {
        &self.target_os
    }

    fn output_files(&self) -> &OutputFiles {
        &self.output_files
    }
}

impl Validate for ShipmentConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("output.dir", &self.output_path)?;
        validation::validate_non_empty_string("output.target_os", &self.target_os)?;
        validation::validate_file_name("output.files.label", &self.output_files.label)?;
        validation::validate_file_name("output.files.large", &self.output_files.large)?;
        validation::validate_file_name("output.files.summary", &self.output_files.summary)?;
        Ok(())
    }
}
