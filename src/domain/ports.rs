use crate::domain::model::{Problem, RuleCatalog, SampleIndex};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Read-only view of the tree holding rules and samples.
pub trait SourceTree: Send + Sync {
    fn is_dir(&self, path: &Path) -> impl std::future::Future<Output = bool> + Send;

    /// Files under `root` whose name ends in `.<ext>` for one of `extensions`,
    /// in file-name order.
    fn list_files(
        &self,
        root: &Path,
        extensions: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<PathBuf>>> + Send;

    fn read_to_string(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = std::io::Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn rules_dir(&self) -> PathBuf;
    fn tests_dir(&self) -> PathBuf;
    fn rule_extensions(&self) -> &[String];
    fn sample_extensions(&self) -> &[String];
    fn max_concurrent_reads(&self) -> usize;
    fn strict(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Problems that make scanning pointless, e.g. missing directories.
    async fn preflight(&self) -> Result<Vec<Problem>>;
    async fn collect_rules(&self) -> Result<RuleCatalog>;
    async fn collect_samples(&self) -> Result<SampleIndex>;
    fn strict(&self) -> bool;
}
