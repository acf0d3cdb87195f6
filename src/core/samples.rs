//! Scanner for `@PositiveRuleSample` / `@NegativeRuleSample` annotations.
//!
//! The scan is textual: the sources are never compiled, so annotations inside
//! comments count as well.

use crate::domain::model::{RuleKey, SampleAnnotation, SampleKind};
use regex::Regex;
use std::sync::LazyLock;

struct AnnotationPatterns {
    kind: SampleKind,
    value_first: Regex,
    id_first: Regex,
}

impl AnnotationPatterns {
    fn new(kind: SampleKind) -> Self {
        let name = kind.annotation();
        let value_first = format!(
            r#"@{}\s*\(\s*value\s*=\s*"([^"]+)"\s*,\s*id\s*=\s*"([^"]+)"[\s\S]*?\)"#,
            name
        );
        let id_first = format!(
            r#"@{}\s*\(\s*id\s*=\s*"([^"]+)"\s*,\s*value\s*=\s*"([^"]+)"[\s\S]*?\)"#,
            name
        );
        Self {
            kind,
            value_first: Regex::new(&value_first).expect("annotation pattern is valid"),
            id_first: Regex::new(&id_first).expect("annotation pattern is valid"),
        }
    }
}

static PATTERNS: LazyLock<[AnnotationPatterns; 2]> = LazyLock::new(|| {
    [
        AnnotationPatterns::new(SampleKind::Positive),
        AnnotationPatterns::new(SampleKind::Negative),
    ]
});

/// Extracts every sample annotation from `content`. `file` is recorded as-is.
///
/// For each kind, value-first matches come before id-first matches.
pub fn scan_samples(file: &str, content: &str) -> Vec<SampleAnnotation> {
    let mut annotations = Vec::new();

    for patterns in PATTERNS.iter() {
        for caps in patterns.value_first.captures_iter(content) {
            let start = caps.get(0).map_or(0, |m| m.start());
            annotations.push(SampleAnnotation {
                kind: patterns.kind,
                key: RuleKey::new(normalize_rule_path(&caps[1]), &caps[2]),
                file: file.to_string(),
                line: line_of(content, start),
            });
        }

        for caps in patterns.id_first.captures_iter(content) {
            let start = caps.get(0).map_or(0, |m| m.start());
            annotations.push(SampleAnnotation {
                kind: patterns.kind,
                key: RuleKey::new(normalize_rule_path(&caps[2]), &caps[1]),
                file: file.to_string(),
                line: line_of(content, start),
            });
        }
    }

    annotations
}

pub fn normalize_rule_path(value: &str) -> String {
    value.replace('\\', "/")
}

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}
