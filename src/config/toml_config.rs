use crate::utils::error::{CheckError, Result};
use crate::utils::validation::{validate_allowed_values, validate_non_empty_string, validate_path, Validate};
use crate::domain::model::ExportFormat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub tool: Option<ToolConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub formats: Option<Vec<String>>,
    pub archive: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CheckError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CheckError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HOLEHE_BIN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CheckError::ConfigError {
            message: e.to_string(),
        })?;

        if let Some(missing) = re
            .captures_iter(content)
            .map(|caps| caps[1].to_string())
            .find(|name| std::env::var(name).is_err())
        {
            return Err(CheckError::ConfigError {
                message: format!("environment variable {} is not set", missing),
            });
        }

        let result = re.replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        Ok(result.to_string())
    }

    pub fn command(&self) -> Option<&str> {
        self.tool.as_ref()?.command.as_deref()
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output.as_ref()?.path.as_deref()
    }

    pub fn formats(&self) -> Option<&[String]> {
        self.output.as_ref()?.formats.as_deref()
    }

    pub fn archive(&self) -> Option<bool> {
        self.output.as_ref()?.archive
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(command) = self.command() {
            validate_non_empty_string("tool.command", command)?;
        }
        if let Some(path) = self.output_path() {
            validate_path("output.path", path)?;
        }
        if let Some(formats) = self.formats() {
            validate_allowed_values("output.formats", formats, &ExportFormat::STRUCTURED_NAMES)?;
        }
        Ok(())
    }
}
