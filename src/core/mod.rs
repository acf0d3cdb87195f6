pub mod coverage;
pub mod engine;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod samples;
pub mod yaml;

pub use crate::domain::model::{CoverageReport, RuleCatalog, SampleIndex};
pub use crate::domain::ports::{ConfigProvider, Pipeline, SourceTree};
pub use crate::utils::error::Result;
