//! Page-state serialization.
//!
//! The client page context is embedded as a JavaScript expression rather
//! than JSON, so values JSON cannot carry survive the trip to the browser:
//! `undefined`, dates, maps, sets, bigints, regular expressions, `NaN` and
//! the infinities.
//!
//! Output is safe to place inside an inline `<script>`: no string or key can
//! produce `</script>` or `<!--`.

use chrono::{DateTime, Utc};

use crate::utils::{escape_js_string, is_js_identifier};

/// A value of the page state tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PageValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Date(DateTime<Utc>),
    RegExp { source: String, flags: String },
    Array(Vec<PageValue>),
    Set(Vec<PageValue>),
    Map(Vec<(PageValue, PageValue)>),
    /// Properties in insertion order.
    Object(Vec<(String, PageValue)>),
}

impl PageValue {
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, PageValue)>,
    {
        PageValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Property lookup on objects. The last definition of a key wins, as in
    /// a JS object literal.
    pub fn get(&self, key: &str) -> Option<&PageValue> {
        match self {
            PageValue::Object(entries) => entries.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PageValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, PageValue::Object(_))
    }
}

impl From<serde_json::Value> for PageValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PageValue::Null,
            serde_json::Value::Bool(b) => PageValue::Bool(b),
            serde_json::Value::Number(n) => PageValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => PageValue::String(s),
            serde_json::Value::Array(items) => {
                PageValue::Array(items.into_iter().map(PageValue::from).collect())
            }
            serde_json::Value::Object(map) => {
                PageValue::Object(map.into_iter().map(|(k, v)| (k, PageValue::from(v))).collect())
            }
        }
    }
}

impl From<&str> for PageValue {
    fn from(value: &str) -> Self {
        PageValue::String(value.to_string())
    }
}

impl From<String> for PageValue {
    fn from(value: String) -> Self {
        PageValue::String(value)
    }
}

impl From<bool> for PageValue {
    fn from(value: bool) -> Self {
        PageValue::Bool(value)
    }
}

impl From<f64> for PageValue {
    fn from(value: f64) -> Self {
        PageValue::Number(value)
    }
}

impl From<i64> for PageValue {
    fn from(value: i64) -> Self {
        PageValue::Number(value as f64)
    }
}

impl From<DateTime<Utc>> for PageValue {
    fn from(value: DateTime<Utc>) -> Self {
        PageValue::Date(value)
    }
}

impl<T: Into<PageValue>> From<Option<T>> for PageValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PageValue::Undefined)
    }
}

/// Serialize `value` as a JavaScript expression.
pub fn uneval(value: &PageValue) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &PageValue) {
    match value {
        PageValue::Undefined => out.push_str("void 0"),
        PageValue::Null => out.push_str("null"),
        PageValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        PageValue::Number(n) => write_number(out, *n),
        PageValue::BigInt(n) => {
            out.push_str(&n.to_string());
            out.push('n');
        }
        PageValue::String(s) => out.push_str(&escape_js_string(s)),
        PageValue::Date(date) => {
            out.push_str("new Date(");
            out.push_str(&date.timestamp_millis().to_string());
            out.push(')');
        }
        PageValue::RegExp { source, flags } => {
            out.push_str("new RegExp(");
            out.push_str(&escape_js_string(source));
            out.push(',');
            out.push_str(&escape_js_string(flags));
            out.push(')');
        }
        PageValue::Array(items) => {
            out.push('[');
            write_list(out, items);
            out.push(']');
        }
        PageValue::Set(items) => {
            out.push_str("new Set([");
            write_list(out, items);
            out.push_str("])");
        }
        PageValue::Map(entries) => {
            out.push_str("new Map([");
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('[');
                write_value(out, key);
                out.push(',');
                write_value(out, value);
                out.push(']');
            }
            out.push_str("])");
        }
        PageValue::Object(entries) => {
            out.push('{');
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_key(out, key);
                out.push(':');
                write_value(out, value);
            }
            out.push('}');
        }
    }
}

fn write_list(out: &mut String, items: &[PageValue]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_value(out, item);
    }
}

fn write_key(out: &mut String, key: &str) {
    if key == "__proto__" {
        // A literal `__proto__:` key would set the prototype instead
        out.push_str("[\"__proto__\"]");
    } else if is_js_identifier(key) {
        out.push_str(key);
    } else {
        out.push_str(&escape_js_string(key));
    }
}

fn write_number(out: &mut String, n: f64) {
    if n.is_nan() {
        out.push_str("NaN");
    } else if n.is_infinite() {
        out.push_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
    } else if n == 0.0 && n.is_sign_negative() {
        out.push_str("-0");
    } else {
        out.push_str(&n.to_string());
    }
}
