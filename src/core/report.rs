use crate::domain::model::{CoverageReport, RuleKey};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

pub const PASSED_MESSAGE: &str = "Rule coverage check passed: all rules valid and covered.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    passed: bool,
    rule_files: usize,
    sample_files: usize,
    active_rules: usize,
    covered_rules: usize,
    uncovered: Vec<&'a RuleKey>,
    problems: Vec<String>,
    warnings: Vec<String>,
}

pub fn render_json(report: &CoverageReport) -> Result<String> {
    let json = JsonReport {
        generated_at: report.generated_at,
        passed: report.passed(),
        rule_files: report.rule_files,
        sample_files: report.sample_files,
        active_rules: report.active_rules,
        covered_rules: report.covered_rules,
        uncovered: report.uncovered().collect(),
        problems: report.problems.iter().map(ToString::to_string).collect(),
        warnings: report.warnings.iter().map(ToString::to_string).collect(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Failures and warnings go to `err`, the success line to `out`.
pub fn write_text<O: Write, E: Write>(
    report: &CoverageReport,
    out: &mut O,
    err: &mut E,
) -> std::io::Result<()> {
    if report.passed() {
        writeln!(out, "{}", PASSED_MESSAGE)?;
    } else {
        writeln!(
            err,
            "Rule coverage check failed with {} problem(s):",
            report.problems.len()
        )?;
        for problem in &report.problems {
            writeln!(err, " - {}", problem)?;
        }
    }

    if !report.warnings.is_empty() {
        writeln!(
            err,
            "Rule coverage check produced {} warning(s):",
            report.warnings.len()
        )?;
        for warning in &report.warnings {
            writeln!(err, " - {}", warning)?;
        }
    }

    Ok(())
}

pub fn write_report<O: Write, E: Write>(
    report: &CoverageReport,
    format: ReportFormat,
    out: &mut O,
    err: &mut E,
) -> Result<()> {
    match format {
        ReportFormat::Text => write_text(report, out, err)?,
        ReportFormat::Json => writeln!(out, "{}", render_json(report)?)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Problem, Warning};

    fn failing_report() -> CoverageReport {
        let mut report = CoverageReport::aborted(vec![
            Problem::RootNotMap {
                rule_path: "java/broken.yaml".to_string(),
            },
            Problem::Uncovered(RuleKey::new("java/security/xss.yaml", "xss-in-spring-app")),
        ]);
        report.warnings.push(Warning::DuplicateRule(RuleKey::new(
            "java/security/xss.yaml",
            "xss-in-servlet-app",
        )));
        report
    }

    #[test]
    fn test_text_failure_goes_to_stderr() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        write_text(&failing_report(), &mut out, &mut err).unwrap();

        assert!(out.is_empty());
        let err = String::from_utf8(err).unwrap();
        assert_eq!(
            err,
            "Rule coverage check failed with 2 problem(s):\n\
             \x20- INVALID YAML (root not a map): java/broken.yaml\n\
             \x20- UNCOVERED RULE: path='java/security/xss.yaml', id='xss-in-spring-app'\n\
             Rule coverage check produced 1 warning(s):\n\
             \x20- DUPLICATE RULE ID: path='java/security/xss.yaml', id='xss-in-servlet-app'\n"
        );
    }

    #[test]
    fn test_text_success_goes_to_stdout() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        write_text(&CoverageReport::aborted(Vec::new()), &mut out, &mut err).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", PASSED_MESSAGE));
        assert!(err.is_empty());
    }

    #[test]
    fn test_json_report() {
        let json = render_json(&failing_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["passed"], false);
        assert_eq!(value["problems"].as_array().unwrap().len(), 2);
        assert_eq!(value["uncovered"][0]["id"], "xss-in-spring-app");
        assert_eq!(value["uncovered"][0]["rule_path"], "java/security/xss.yaml");
        assert_eq!(value["warnings"].as_array().unwrap().len(), 1);
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_write_report_json_uses_stdout_only() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        write_report(&failing_report(), ReportFormat::Json, &mut out, &mut err).unwrap();
        assert!(!out.is_empty());
        assert!(err.is_empty());
    }
}
