pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, CheckConfig};

pub use adapters::ProcessRunner;
pub use core::{etl::CheckEngine, pipeline::HolehePipeline};
pub use domain::model::{CheckReport, CheckRequest, Outcome, ServiceFilter};
pub use utils::error::{CheckError, Result};
