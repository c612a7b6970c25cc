use serde_json::{Map, Value};

/// Fields that together form one instruction-tuning example.
const INSTRUCTION_TRIPLE: [&str; 3] = ["instruction", "input", "output"];

/// Text-bearing field names, most specific first.
const TEXT_FIELDS: [&str; 14] = [
    "text",
    "content",
    "article",
    "body",
    "question",
    "input",
    "output",
    "prompt",
    "context",
    "answer",
    "choices",
    "option",
    "options",
    "instruction",
];

pub trait RecordExtractor: Send + Sync {
    fn extract(&self, record: &Value) -> Option<String>;
}

/// Best-effort text extraction from loosely shaped JSON records:
/// - an `instruction`/`input`/`output` triple, newline-joined
/// - the first non-empty well-known text field
/// - the first string (or string list) field in document order
/// - text found in the first nested object or list of objects
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicExtractor;

impl RecordExtractor for HeuristicExtractor {
    fn extract(&self, record: &Value) -> Option<String> {
        extract_text(record)
    }
}

/// An empty result counts as nothing extracted.
pub fn extract_text(record: &Value) -> Option<String> {
    let text = match record {
        Value::Object(fields) => extract_from_object(fields),
        Value::String(text) => Some(text.clone()),
        Value::Array(items) if starts_with_string(items) => Some(join_strings(items)),
        _ => None,
    };
    text.filter(|text| !text.is_empty())
}

fn extract_from_object(fields: &Map<String, Value>) -> Option<String> {
    if INSTRUCTION_TRIPLE.iter().all(|key| fields.contains_key(*key)) {
        let parts: Vec<String> = INSTRUCTION_TRIPLE
            .iter()
            .filter_map(|key| fields.get(*key))
            .filter(|value| is_truthy(value))
            .map(stringify)
            .collect();
        if !parts.is_empty() {
            return Some(parts.join("\n"));
        }
    }

    for key in TEXT_FIELDS {
        match fields.get(key) {
            Some(Value::String(text)) if !text.is_empty() => return Some(text.clone()),
            Some(Value::Array(items)) if !items.is_empty() => {
                let joined = join_mixed(items);
                if !joined.is_empty() {
                    return Some(joined);
                }
            }
            _ => {}
        }
    }

    // A string list ends the search even when it joins to nothing.
    for value in fields.values() {
        match value {
            Value::String(text) if !text.is_empty() => return Some(text.clone()),
            Value::Array(items) if starts_with_string(items) => return Some(join_strings(items)),
            _ => {}
        }
    }

    for value in fields.values() {
        match value {
            Value::Object(_) => {
                if let Some(text) = extract_text(value) {
                    return Some(text);
                }
            }
            Value::Array(items) if matches!(items.first(), Some(Value::Object(_))) => {
                let parts: Vec<String> = items.iter().filter_map(extract_text).collect();
                if !parts.is_empty() {
                    return Some(parts.join(" "));
                }
            }
            _ => {}
        }
    }

    None
}

/// Strings are kept as-is and objects contribute their extracted text.
fn join_mixed(items: &[Value]) -> String {
    let parts: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(text) => Some(text.clone()),
            Value::Object(_) => extract_text(item),
            _ => None,
        })
        .collect();
    parts.join(" ")
}

fn join_strings(items: &[Value]) -> String {
    items
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

fn starts_with_string(items: &[Value]) -> bool {
    matches!(items.first(), Some(Value::String(_)))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
