use crate::core::rules::{parse_rule_file, RuleFileOutcome};
use crate::core::samples::scan_samples;
use crate::core::{ConfigProvider, Pipeline, SourceTree};
use crate::domain::model::{Problem, RuleCatalog, SampleIndex};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub struct CoveragePipeline<S: SourceTree, C: ConfigProvider> {
    tree: Arc<S>,
    config: C,
}

impl<S: SourceTree + 'static, C: ConfigProvider> CoveragePipeline<S, C> {
    pub fn new(tree: S, config: C) -> Self {
        Self {
            tree: Arc::new(tree),
            config,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Reads every file concurrently; the result keeps the input order.
    async fn read_all(&self, files: Vec<PathBuf>) -> Result<Vec<(PathBuf, std::io::Result<String>)>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_reads().max(1)));
        let mut reads = JoinSet::new();

        for (index, path) in files.into_iter().enumerate() {
            let tree = Arc::clone(&self.tree);
            let semaphore = Arc::clone(&semaphore);
            reads.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let content = tree.read_to_string(&path).await;
                (index, path, content)
            });
        }

        let mut results = Vec::with_capacity(reads.len());
        while let Some(joined) = reads.join_next().await {
            results.push(joined?);
        }
        results.sort_by_key(|(index, _, _)| *index);

        Ok(results
            .into_iter()
            .map(|(_, path, content)| (path, content))
            .collect())
    }
}

#[async_trait::async_trait]
impl<S: SourceTree + 'static, C: ConfigProvider> Pipeline for CoveragePipeline<S, C> {
    async fn preflight(&self) -> Result<Vec<Problem>> {
        let mut problems = Vec::new();

        let rules_dir = self.config.rules_dir();
        if !self.tree.is_dir(&rules_dir).await {
            problems.push(Problem::RulesDirMissing {
                path: rules_dir.display().to_string(),
            });
        }

        let tests_dir = self.config.tests_dir();
        if !self.tree.is_dir(&tests_dir).await {
            problems.push(Problem::TestsDirMissing {
                path: tests_dir.display().to_string(),
            });
        }

        Ok(problems)
    }

    async fn collect_rules(&self) -> Result<RuleCatalog> {
        let root = self.config.rules_dir();
        let files = self
            .tree
            .list_files(&root, self.config.rule_extensions())
            .await?;
        tracing::debug!("Reading {} rule files from {}", files.len(), root.display());

        let mut catalog = RuleCatalog {
            files_scanned: files.len(),
            ..Default::default()
        };

        for (path, content) in self.read_all(files).await? {
            let rule_path = relative_path(&root, &path);
            let outcome = match content {
                Ok(content) => parse_rule_file(&rule_path, &content),
                Err(e) => RuleFileOutcome {
                    problems: vec![Problem::YamlParse {
                        rule_path: rule_path.clone(),
                        message: e.to_string(),
                    }],
                    ..Default::default()
                },
            };

            if !outcome.problems.is_empty() {
                tracing::debug!("{} problem(s) in {}", outcome.problems.len(), rule_path);
            }
            catalog.rules.extend(outcome.rules);
            catalog.problems.extend(outcome.problems);
            catalog.warnings.extend(outcome.warnings);
        }

        Ok(catalog)
    }

    async fn collect_samples(&self) -> Result<SampleIndex> {
        let root = self.config.tests_dir();
        let files = self
            .tree
            .list_files(&root, self.config.sample_extensions())
            .await?;
        tracing::debug!("Scanning {} sample files under {}", files.len(), root.display());

        let mut index = SampleIndex {
            files_scanned: files.len(),
            ..Default::default()
        };

        for (path, content) in self.read_all(files).await? {
            let file = relative_path(&root, &path);
            match content {
                Ok(content) => index.annotations.extend(scan_samples(&file, &content)),
                Err(e) => {
                    tracing::warn!("Cannot read sample file {}: {}", file, e);
                    index.problems.push(Problem::UnreadableSample {
                        file,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(index)
    }

    fn strict(&self) -> bool {
        self.config.strict()
    }
}

/// `path` relative to `root`, always `/`-separated.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        let root = Path::new("/repo/rules");
        assert_eq!(
            relative_path(root, Path::new("/repo/rules/java/security/sqli.yaml")),
            "java/security/sqli.yaml"
        );
        assert_eq!(relative_path(root, Path::new("/repo/rules/top.yaml")), "top.yaml");
    }
}
