//! YAML 1.1 loader for rule files.
//!
//! Rule repositories are written against a YAML 1.1 reader: plain `yes`/`no`/`on`/`off`
//! are booleans, plain dates are timestamps, a repeated mapping key keeps its last
//! value and `<<` merges mappings. The event stream comes from `yaml-rust2`, which
//! keeps the scalar style needed to tell `no` from `"no"`; the result is a
//! `serde_yaml::Value` tree.

use regex::Regex;
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Number, Value};
use std::collections::HashMap;
use std::sync::LazyLock;
use yaml_rust2::parser::{Event, EventReceiver, Parser};
use yaml_rust2::scanner::TScalarStyle;

static BOOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:yes|Yes|YES|no|No|NO|true|True|TRUE|false|False|FALSE|on|On|ON|off|Off|OFF)$")
        .expect("bool pattern is valid")
});

static INT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[-+]?0b_*[0-1]+[0-1_]*|[-+]?0_*[0-7]+[0-7_]*|[-+]?(?:0|[1-9][0-9_]*)|[-+]?0x_*[0-9a-fA-F]+[0-9a-fA-F_]*|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+)$",
    )
    .expect("int pattern is valid")
});

static FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[-+]?(?:\.[0-9]+|[0-9][0-9_]*(?:\.[0-9_]*)?)(?:[eE][-+]?[0-9]+)?|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$",
    )
    .expect("float pattern is valid")
});

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[0-9]{4}-[0-9]{2}-[0-9]{2}|[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}(?:[Tt]|[ \t]+)[0-9]{1,2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]*)?(?:[ \t]*(?:Z|[-+][0-9]{1,2}(?::[0-9]{2})?))?)$",
    )
    .expect("timestamp pattern is valid")
});

/// Loads a single-document YAML stream. An empty stream is `Null`.
pub fn load(content: &str) -> Result<Value, String> {
    let mut builder = ValueBuilder::default();
    Parser::new(content.chars())
        .load(&mut builder, true)
        .map_err(|e| e.to_string())?;

    if let Some(error) = builder.error {
        return Err(error);
    }
    if builder.documents.len() > 1 {
        return Err(format!(
            "expected a single document in the stream, found {}",
            builder.documents.len()
        ));
    }
    Ok(builder.documents.pop().unwrap_or(Value::Null))
}

enum MapKey {
    Value(Value),
    Merge,
}

enum Frame {
    Sequence {
        anchor: usize,
        items: Vec<Value>,
    },
    Mapping {
        anchor: usize,
        entries: Mapping,
        pending_key: Option<MapKey>,
        merges: Vec<Value>,
    },
}

#[derive(Default)]
struct ValueBuilder {
    stack: Vec<Frame>,
    anchors: HashMap<usize, Value>,
    documents: Vec<Value>,
    error: Option<String>,
}

impl ValueBuilder {
    fn complete(&mut self, value: Value, anchor: usize, is_merge_key: bool) {
        if anchor > 0 {
            self.anchors.insert(anchor, value.clone());
        }

        match self.stack.last_mut() {
            None => self.documents.push(value),
            Some(Frame::Sequence { items, .. }) => items.push(value),
            Some(Frame::Mapping {
                entries,
                pending_key,
                merges,
                ..
            }) => match pending_key.take() {
                None if is_merge_key => *pending_key = Some(MapKey::Merge),
                None => *pending_key = Some(MapKey::Value(value)),
                Some(MapKey::Merge) => merges.push(value),
                // last value wins for repeated keys
                Some(MapKey::Value(key)) => {
                    entries.insert(key, value);
                }
            },
        }
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
    }
}

impl EventReceiver for ValueBuilder {
    fn on_event(&mut self, event: Event) {
        match event {
            Event::Scalar(value, style, anchor, tag) => {
                let is_merge_key = matches!(style, TScalarStyle::Plain) && value == "<<";
                let explicit_str = tag
                    .as_ref()
                    .is_some_and(|tag| tag.suffix == "str" && is_core_handle(&tag.handle));
                let resolved = if matches!(style, TScalarStyle::Plain) && !explicit_str {
                    resolve_plain(value)
                } else {
                    Value::String(value)
                };
                self.complete(resolved, anchor, is_merge_key && !explicit_str);
            }
            Event::Alias(anchor) => match self.anchors.get(&anchor).cloned() {
                Some(value) => self.complete(value, 0, false),
                None => self.fail(format!("unknown alias (anchor id {})", anchor)),
            },
            Event::SequenceStart(anchor, _) => self.stack.push(Frame::Sequence {
                anchor,
                items: Vec::new(),
            }),
            Event::MappingStart(anchor, _) => self.stack.push(Frame::Mapping {
                anchor,
                entries: Mapping::new(),
                pending_key: None,
                merges: Vec::new(),
            }),
            Event::SequenceEnd => {
                if let Some(Frame::Sequence { anchor, items }) = self.stack.pop() {
                    self.complete(Value::Sequence(items), anchor, false);
                }
            }
            Event::MappingEnd => {
                if let Some(Frame::Mapping {
                    anchor,
                    mut entries,
                    merges,
                    ..
                }) = self.stack.pop()
                {
                    for merge in merges {
                        if let Err(message) = apply_merge(&mut entries, merge) {
                            self.fail(message);
                        }
                    }
                    self.complete(Value::Mapping(entries), anchor, false);
                }
            }
            _ => {}
        }
    }
}

fn is_core_handle(handle: &str) -> bool {
    handle == "!!" || handle == "tag:yaml.org,2002:"
}

/// Explicit keys win over merged ones; within a merged list, earlier maps win.
fn apply_merge(entries: &mut Mapping, merge: Value) -> Result<(), String> {
    let sources = match merge {
        Value::Mapping(source) => vec![source],
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Mapping(source) => Ok(source),
                _ => Err("merge list must contain only mappings".to_string()),
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err("merge value must be a mapping or a list of mappings".to_string()),
    };

    for source in sources {
        for (key, value) in source {
            if !entries.contains_key(&key) {
                entries.insert(key, value);
            }
        }
    }
    Ok(())
}

fn resolve_plain(value: String) -> Value {
    if value.is_empty() || matches!(value.as_str(), "~" | "null" | "Null" | "NULL") {
        return Value::Null;
    }
    if BOOL.is_match(&value) {
        let truthy = matches!(value.as_bytes()[0], b'y' | b'Y' | b't' | b'T')
            || value.eq_ignore_ascii_case("on");
        return Value::Bool(truthy);
    }
    if INT.is_match(&value) {
        return parse_int(&value);
    }
    if FLOAT.is_match(&value) {
        return Value::Number(Number::from(parse_float(&value)));
    }
    if TIMESTAMP.is_match(&value) {
        return Value::Tagged(Box::new(TaggedValue {
            tag: Tag::new("timestamp"),
            value: Value::String(value),
        }));
    }
    Value::String(value)
}

fn parse_int(value: &str) -> Value {
    let cleaned = value.replace('_', "");
    let (negative, digits) = match cleaned.as_bytes()[0] {
        b'-' => (true, &cleaned[1..]),
        b'+' => (false, &cleaned[1..]),
        _ => (false, cleaned.as_str()),
    };

    let magnitude = if let Some(bin) = digits.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if digits.contains(':') {
        digits.split(':').try_fold(0i64, |acc, part| {
            acc.checked_mul(60)?.checked_add(part.parse::<i64>().ok()?)
        })
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()
    } else {
        digits.parse::<i64>().ok()
    };

    match magnitude {
        Some(n) => Value::Number(Number::from(if negative { -n } else { n })),
        // out of range for i64; still a number, not a string
        None => Value::Number(Number::from(parse_float(value))),
    }
}

fn parse_float(value: &str) -> f64 {
    let cleaned = value.replace('_', "");
    let (negative, body) = match cleaned.as_bytes()[0] {
        b'-' => (true, &cleaned[1..]),
        b'+' => (false, &cleaned[1..]),
        _ => (false, cleaned.as_str()),
    };

    let magnitude = if body.eq_ignore_ascii_case(".inf") {
        f64::INFINITY
    } else if body.eq_ignore_ascii_case(".nan") {
        f64::NAN
    } else if body.contains(':') {
        body.split(':')
            .fold(0.0, |acc, part| acc * 60.0 + part.parse::<f64>().unwrap_or(0.0))
    } else {
        body.parse::<f64>().unwrap_or(f64::NAN)
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}
