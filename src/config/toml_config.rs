use crate::core::report::ReportFormat;
use crate::core::ConfigProvider;
use crate::utils::error::{CoverageError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const DEFAULT_PROJECT_ROOT: &str = "..";
pub const DEFAULT_RULES_DIR: &str = "rules";
pub const DEFAULT_TESTS_DIR: &str = "test/src/main/java/security";
pub const DEFAULT_MAX_CONCURRENT_READS: usize = 16;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub project: ProjectConfig,
    pub scan: ScanConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub root: String,
    /// Relative paths resolve against `root`.
    pub rules_dir: String,
    pub tests_dir: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_PROJECT_ROOT.to_string(),
            rules_dir: DEFAULT_RULES_DIR.to_string(),
            tests_dir: DEFAULT_TESTS_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub rule_extensions: Vec<String>,
    pub sample_extensions: Vec<String>,
    pub max_concurrent_reads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rule_extensions: vec!["yaml".to_string()],
            sample_extensions: vec!["java".to_string()],
            max_concurrent_reads: DEFAULT_MAX_CONCURRENT_READS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
    /// Treat warnings as problems.
    pub strict: bool,
}

impl CoverageConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CoverageError::ConfigError {
            message: format!("cannot read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            CoverageError::ConfigParseError { message, .. } => CoverageError::ConfigParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| CoverageError::ConfigParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay verbatim.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let name = &caps[1];
                std::env::var(name).unwrap_or_else(|_| format!("${{{}}}", name))
            })
            .into_owned()
    }

    /// The project root, canonicalized when it exists.
    pub fn project_root(&self) -> PathBuf {
        let root = Path::new(&self.project.root);
        root.canonicalize().unwrap_or_else(|_| root.to_path_buf())
    }
}

impl Validate for CoverageConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("project.root", &self.project.root)?;
        validation::validate_path("project.rules_dir", &self.project.rules_dir)?;
        validation::validate_path("project.tests_dir", &self.project.tests_dir)?;
        validation::validate_extensions("scan.rule_extensions", &self.scan.rule_extensions)?;
        validation::validate_extensions("scan.sample_extensions", &self.scan.sample_extensions)?;
        validation::validate_at_least(
            "scan.max_concurrent_reads",
            self.scan.max_concurrent_reads,
            1,
        )?;
        Ok(())
    }
}

impl ConfigProvider for CoverageConfig {
    fn rules_dir(&self) -> PathBuf {
        self.project_root().join(&self.project.rules_dir)
    }

    fn tests_dir(&self) -> PathBuf {
        self.project_root().join(&self.project.tests_dir)
    }

    fn rule_extensions(&self) -> &[String] {
        &self.scan.rule_extensions
    }

    fn sample_extensions(&self) -> &[String] {
        &self.scan.sample_extensions
    }

    fn max_concurrent_reads(&self) -> usize {
        self.scan.max_concurrent_reads
    }

    fn strict(&self) -> bool {
        self.report.strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_gradle_layout() {
        let config = CoverageConfig::default();
        assert_eq!(config.project.root, "..");
        assert_eq!(config.project.rules_dir, "rules");
        assert_eq!(config.project.tests_dir, "test/src/main/java/security");
        assert_eq!(config.scan.rule_extensions, vec!["yaml"]);
        assert_eq!(config.scan.sample_extensions, vec!["java"]);
        assert_eq!(config.report.format, ReportFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = CoverageConfig::from_toml_str(
            r#"
[project]
root = "/work/rules-repo"

[scan]
sample_extensions = ["java", "kt"]

[report]
format = "json"
strict = true
"#,
        )
        .unwrap();

        assert_eq!(config.project.root, "/work/rules-repo");
        assert_eq!(config.project.rules_dir, "rules");
        assert_eq!(config.scan.sample_extensions, vec!["java", "kt"]);
        assert_eq!(config.scan.max_concurrent_reads, DEFAULT_MAX_CONCURRENT_READS);
        assert_eq!(config.report.format, ReportFormat::Json);
        assert!(config.strict());
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("RULE_COVERAGE_TEST_ROOT", "/ci/checkout");
        let config = CoverageConfig::from_toml_str(
            r#"
[project]
root = "${RULE_COVERAGE_TEST_ROOT}"
tests_dir = "${RULE_COVERAGE_SURELY_UNSET_VAR}"
"#,
        )
        .unwrap();

        assert_eq!(config.project.root, "/ci/checkout");
        assert_eq!(config.project.tests_dir, "${RULE_COVERAGE_SURELY_UNSET_VAR}");
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let err = CoverageConfig::from_toml_str("[project\nroot = 1").unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_config_file_is_a_config_error() {
        let err = CoverageConfig::from_file("/definitely/not/here/rule-coverage.toml").unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("/definitely/not/here/rule-coverage.toml"));
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let mut config = CoverageConfig::default();
        config.scan.max_concurrent_reads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dirs_resolve_against_root() {
        let mut config = CoverageConfig::default();
        config.project.root = "/definitely/not/here".to_string();
        config.project.tests_dir = "/abs/tests".to_string();

        assert_eq!(config.rules_dir(), PathBuf::from("/definitely/not/here/rules"));
        assert_eq!(config.tests_dir(), PathBuf::from("/abs/tests"));
    }
}
