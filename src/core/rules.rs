//! Rule file validation.
//!
//! Only the parts of the rule format that decide coverage are inspected:
//! `rules[].id`, `rules[].options.disabled` and `rules[].options.lib`.
//! Documents are read with YAML 1.1 scalar resolution (see [`super::yaml`]).

use super::yaml;
use crate::domain::model::{Problem, RuleDefinition, RuleKey, Warning};
use serde_yaml::Value;
use std::collections::HashSet;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleFileOutcome {
    pub rules: Vec<RuleDefinition>,
    pub problems: Vec<Problem>,
    pub warnings: Vec<Warning>,
}

/// Parses one rule file. `rule_path` is the file relative to the rules directory.
pub fn parse_rule_file(rule_path: &str, content: &str) -> RuleFileOutcome {
    let mut outcome = RuleFileOutcome::default();

    let document = match yaml::load(content) {
        Ok(document) => document,
        Err(message) => {
            outcome.problems.push(Problem::YamlParse {
                rule_path: rule_path.to_string(),
                message,
            });
            return outcome;
        }
    };

    if !document.is_mapping() {
        outcome.problems.push(Problem::RootNotMap {
            rule_path: rule_path.to_string(),
        });
        return outcome;
    }

    let Some(entries) = document.get("rules").and_then(Value::as_sequence) else {
        outcome.problems.push(Problem::MissingRulesList {
            rule_path: rule_path.to_string(),
        });
        return outcome;
    };

    let mut seen_ids = HashSet::new();
    for entry in entries {
        if !entry.is_mapping() {
            outcome.problems.push(Problem::RuleEntryNotMap {
                rule_path: rule_path.to_string(),
            });
            continue;
        }

        let id = match entry.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
            _ => {
                outcome.problems.push(Problem::BlankRuleId {
                    rule_path: rule_path.to_string(),
                });
                continue;
            }
        };

        let (disabled, lib) = rule_flags(entry.get("options"));
        let key = RuleKey::new(rule_path, id);

        if !seen_ids.insert(key.id.clone()) {
            tracing::debug!("Duplicate rule id {} in {}", key.id, rule_path);
            outcome.warnings.push(Warning::DuplicateRule(key.clone()));
        }

        outcome.rules.push(RuleDefinition { key, disabled, lib });
    }

    outcome
}

/// `disabled` holds a reason string; any string disables the rule.
/// `lib` must be a real boolean.
fn rule_flags(options: Option<&Value>) -> (bool, bool) {
    let Some(Value::Mapping(options)) = options else {
        return (false, false);
    };

    let disabled = matches!(options.get("disabled"), Some(Value::String(_)));
    let lib = matches!(options.get("lib"), Some(Value::Bool(true)));
    (disabled, lib)
}
