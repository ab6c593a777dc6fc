pub mod etl;
pub mod export;
pub mod pipeline;
pub mod render;
pub mod summarize;

pub use crate::domain::model::{CheckReport, CheckRequest, Outcome, RunResult, ServiceRecord};
pub use crate::domain::ports::{CommandRunner, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
