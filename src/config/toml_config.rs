use crate::config::{ShipmentConfig, DEFAULT_OUTPUT_PATH, DEFAULT_TARGET_OS};
use crate::core::splitter::DEFAULT_QUANTITY_THRESHOLD;
use crate::domain::model::OutputFiles;
use crate::utils::error::{Result, ShipmentError};
use crate::utils::validation::{self, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    /// `"win"` writes Shift-JIS with CRLF, anything else UTF-8.
    pub target_os: String,
    pub files: OutputFiles,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_OUTPUT_PATH.to_string(),
            target_os: DEFAULT_TARGET_OS.to_string(),
            files: OutputFiles::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub threshold: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_QUANTITY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDR.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ShipmentError::ConfigError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ShipmentError::ConfigError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn shipment_config(&self) -> ShipmentConfig {
        ShipmentConfig {
            output_path: self.output.dir.clone(),
            quantity_threshold: self.split.threshold,
            target_os: self.output.target_os.clone(),
            output_files: self.output.files.clone(),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        validation::validate_socket_addr("server.bind", &self.server.bind)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.shipment_config().validate()?;
        self.bind_addr()?;
        validation::validate_range(
            "server.max_upload_bytes",
            self.server.max_upload_bytes,
            1,
            usize::MAX,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.shipment_config(), ShipmentConfig::default());
        assert_eq!(config.server.bind, DEFAULT_BIND_ADDR);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_file() {
        let content = r#"
[output]
dir = "/srv/shipments"
target_os = "mac"

[output.files]
label = "label.csv"
large = "large.csv"
summary = "all.csv"

[split]
threshold = 6

[server]
bind = "0.0.0.0:9000"
max_upload_bytes = 1024
"#;
        let config = TomlConfig::from_toml_str(content).unwrap();
        let shipment = config.shipment_config();

        assert_eq!(shipment.output_path, "/srv/shipments");
        assert_eq!(shipment.target_os, "mac");
        assert_eq!(shipment.quantity_threshold, 6);
        assert_eq!(shipment.output_files.summary, "all.csv");
        assert_eq!(config.bind_addr().unwrap().port(), 9000);
        assert_eq!(config.server.max_upload_bytes, 1024);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SHIPMENT_TIMES_TEST_DIR", "/tmp/shipments");
        let config =
            TomlConfig::from_toml_str("[output]\ndir = \"${SHIPMENT_TIMES_TEST_DIR}\"\n").unwrap();
        assert_eq!(config.output.dir, "/tmp/shipments");

        let config =
            TomlConfig::from_toml_str("[output]\ndir = \"${SHIPMENT_TIMES_UNSET_VAR}\"\n").unwrap();
        assert_eq!(config.output.dir, "${SHIPMENT_TIMES_UNSET_VAR}");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[split]\nthreshold = \"many\"\n").unwrap_err();
        assert!(matches!(err, ShipmentError::ConfigError { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_bind_address() {
        let config = TomlConfig::from_toml_str("[server]\nbind = \"nowhere\"\n").unwrap();
        assert!(config.validate().is_err());
    }
}
