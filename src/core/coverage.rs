use crate::domain::model::{CoverageReport, Problem, RuleCatalog, SampleIndex, Warning};
use chrono::Utc;

/// Combines a rule catalog and a sample index into the final report.
pub fn evaluate(catalog: RuleCatalog, samples: SampleIndex, strict: bool) -> CoverageReport {
    let covered = samples.covered();
    let active = catalog.active_keys();

    let uncovered: Vec<Problem> = active
        .iter()
        .filter(|key| !covered.contains(**key))
        .map(|key| Problem::Uncovered((*key).clone()))
        .collect();
    let covered_rules = active.len() - uncovered.len();
    let active_rules = active.len();

    let defined = catalog.defined_keys();
    let mut warnings = catalog.warnings.clone();
    for annotation in &samples.annotations {
        if !defined.contains(&annotation.key) {
            warnings.push(Warning::UnknownRuleReference {
                kind: annotation.kind,
                key: annotation.key.clone(),
                file: annotation.file.clone(),
                line: annotation.line,
            });
        }
    }

    let mut problems = catalog.problems;
    problems.extend(samples.problems);
    problems.extend(uncovered);
    if strict {
        problems.extend(warnings.iter().cloned().map(Problem::Strict));
    }

    CoverageReport {
        generated_at: Utc::now(),
        rule_files: catalog.files_scanned,
        sample_files: samples.files_scanned,
        active_rules,
        covered_rules,
        problems,
        warnings,
    }
}
