use crate::config::toml_config::CoverageConfig;
use crate::core::report::ReportFormat;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "rule-coverage")]
#[command(
    about = "Validates YAML rules and ensures each active rule is covered by a @PositiveRuleSample test"
)]
pub struct CliArgs {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Repository root holding the rules and test directories [default: ..]
    #[arg(long)]
    pub project_root: Option<String>,

    /// Rules directory, relative to the project root [default: rules]
    #[arg(long)]
    pub rules_dir: Option<String>,

    /// Sample sources directory, relative to the project root [default: test/src/main/java/security]
    #[arg(long)]
    pub tests_dir: Option<String>,

    /// Rule file extensions, comma separated [default: yaml]
    #[arg(long, value_delimiter = ',')]
    pub rule_ext: Vec<String>,

    /// Sample file extensions, comma separated [default: java]
    #[arg(long, value_delimiter = ',')]
    pub sample_ext: Vec<String>,

    #[arg(long)]
    pub max_concurrent_reads: Option<usize>,

    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Fail on warnings too
    #[arg(long, overrides_with = "no_strict")]
    pub strict: bool,

    /// Report warnings without failing, even if the config file sets strict
    #[arg(long, overrides_with = "strict")]
    pub no_strict: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliArgs {
    /// Defaults, then the config file if given, then command-line overrides.
    pub fn load_config(&self) -> Result<CoverageConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path);
                CoverageConfig::from_file(path)?
            }
            None => CoverageConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut CoverageConfig) {
        if let Some(root) = &self.project_root {
            config.project.root = root.clone();
        }
        if let Some(rules_dir) = &self.rules_dir {
            config.project.rules_dir = rules_dir.clone();
        }
        if let Some(tests_dir) = &self.tests_dir {
            config.project.tests_dir = tests_dir.clone();
        }
        if !self.rule_ext.is_empty() {
            config.scan.rule_extensions = self.rule_ext.clone();
        }
        if !self.sample_ext.is_empty() {
            config.scan.sample_extensions = self.sample_ext.clone();
        }
        if let Some(reads) = self.max_concurrent_reads {
            config.scan.max_concurrent_reads = reads;
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
        if let Some(strict) = self.strict_override() {
            config.report.strict = strict;
        }
    }

    /// `None` when neither `--strict` nor `--no-strict` was given.
    fn strict_override(&self) -> Option<bool> {
        match (self.strict, self.no_strict) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
