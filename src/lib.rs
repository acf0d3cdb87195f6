pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::{CoverageConfig, LocalTree};

pub use crate::core::{engine::CoverageEngine, pipeline::CoveragePipeline, report::ReportFormat};
pub use domain::model::{CoverageReport, Problem, RuleKey, Warning};
pub use utils::error::{CoverageError, Result};
