pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::{ExportFormat, DEFAULT_COMMAND};
use crate::utils::error::{CheckError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use toml_config::TomlConfig;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";

/// Settings after merging the config file with command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    pub command: String,
    pub output_path: String,
    pub formats: Vec<ExportFormat>,
    pub archive: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            formats: ExportFormat::STRUCTURED.to_vec(),
            archive: false,
        }
    }
}

impl CheckConfig {
    /// Layers `file` over the defaults.
    pub fn from_toml(file: &TomlConfig) -> Result<Self> {
        let mut config = Self::default();
        if let Some(command) = file.command() {
            config.command = command.to_string();
        }
        if let Some(path) = file.output_path() {
            config.output_path = path.to_string();
        }
        if let Some(formats) = file.formats() {
            config.formats = parse_formats(formats)?;
        }
        if let Some(archive) = file.archive() {
            config.archive = archive;
        }
        Ok(config)
    }
}

/// Parses the structured download formats. `text` is refused since the raw
/// output download is always written.
pub fn parse_formats(names: &[String]) -> Result<Vec<ExportFormat>> {
    names
        .iter()
        .map(|name| {
            let format: ExportFormat = name.trim().parse()?;
            if ExportFormat::STRUCTURED.contains(&format) {
                Ok(format)
            } else {
                Err(CheckError::ValidationError {
                    message: format!(
                        "'{}' is not a structured format (expected one of {}); the raw output is always written",
                        format,
                        ExportFormat::STRUCTURED_NAMES.join(", ")
                    ),
                })
            }
        })
        .collect()
}

impl ConfigProvider for CheckConfig {
    fn command(&self) -> &str {
        &self.command
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn formats(&self) -> &[ExportFormat] {
        &self.formats
    }

    fn archive(&self) -> bool {
        self.archive
    }
}

impl Validate for CheckConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("command", &self.command)?;
        validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use super::{parse_formats, CheckConfig, TomlConfig};
    use crate::domain::model::{CheckRequest, ServiceFilter, ALL_SERVICES};
    use crate::utils::error::Result;
    use crate::utils::validation::Validate;
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "holehe-checker")]
    #[command(about = "Check which websites are linked to an email address using holehe")]
    pub struct CliConfig {
        /// Email address to check
        pub email: String,

        #[arg(long, help = "Command used to run holehe [default: holehe]")]
        pub command: Option<String>,

        #[arg(long, default_value = ALL_SERVICES, help = "Only keep results for this service")]
        pub filter: String,

        #[arg(
            long,
            value_delimiter = ',',
            help = "Structured download formats: json,csv [default: json,csv]. The raw output is always written"
        )]
        pub formats: Option<Vec<String>>,

        #[arg(long, help = "Directory for downloads [default: ./output]")]
        pub output_path: Option<String>,

        #[arg(long, help = "Bundle all downloads into one zip file")]
        pub archive: bool,

        #[arg(long, help = "TOML configuration file")]
        pub config: Option<String>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Print the report as JSON instead of text")]
        pub json: bool,

        #[arg(long, help = "Log as JSON lines")]
        pub log_json: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,
    }

    impl CliConfig {
        /// Loads the config file, if any, and applies explicit flags on top.
        pub fn resolve(&self) -> Result<CheckConfig> {
            let file = match &self.config {
                Some(path) => {
                    let file = TomlConfig::from_file(path)?;
                    file.validate()?;
                    file
                }
                None => TomlConfig::default(),
            };

            let mut config = CheckConfig::from_toml(&file)?;
            if let Some(command) = &self.command {
                config.command = command.clone();
            }
            if let Some(path) = &self.output_path {
                config.output_path = path.clone();
            }
            if let Some(formats) = &self.formats {
                config.formats = parse_formats(formats)?;
            }
            if self.archive {
                config.archive = true;
            }

            config.validate()?;
            Ok(config)
        }

        /// Request for the given address and filter. The tool command comes from `resolve`.
        pub fn request(&self) -> CheckRequest {
            CheckRequest::new(self.email.as_str()).with_filter(ServiceFilter::from(self.filter.as_str()))
        }
    }

}
