//! Safe navigation over loosely-structured JSON artifacts.
//!
//! Every accessor here returns `None` for a missing key, an explicit `null`,
//! or a non-object intermediate; callers never have to chain null checks.

use serde_json::Value;

/// Walks `path` from `root`. `null` at any level (including the leaf) is absent.
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.as_object()?.get(*key)?;
    }
    if cur.is_null() {
        None
    } else {
        Some(cur)
    }
}

/// Like [`lookup`], but also treats "empty" values (`false`, `0`, `""`, `[]`, `{}`) as absent.
pub fn lookup_truthy<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    lookup(root, path).filter(|v| is_truthy(v))
}

/// Key presence on an object, regardless of the value (an explicit `null` still counts).
pub fn has_key(root: &Value, key: &str) -> bool {
    root.as_object().is_some_and(|m| m.contains_key(key))
}

pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(m) => !m.is_empty(),
    }
}

pub fn str_at(root: &Value, path: &[&str]) -> Option<String> {
    lookup(root, path)
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub fn f64_at(root: &Value, path: &[&str]) -> Option<f64> {
    lookup(root, path).and_then(Value::as_f64)
}

pub fn bool_at(root: &Value, path: &[&str]) -> Option<bool> {
    lookup(root, path).and_then(Value::as_bool)
}

/// Element count of an array (or entry count of an object) at `path`; 0 when absent.
pub fn len_at(root: &Value, path: &[&str]) -> usize {
    match lookup(root, path) {
        Some(Value::Array(a)) => a.len(),
        Some(Value::Object(m)) => m.len(),
        _ => 0,
    }
}
