//! Flat parameter set persisted in the external store.
//!
//! Values are either a single string or a list of strings. A list of one is
//! the same observable value as the single string (they serialize to the
//! same query string), so values are normalized on the way in.

use crate::error::{FilterError, Result};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Characters left alone when encoding a query component.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// Build a value from a list; an empty list is no value at all.
    pub fn from_list(mut values: Vec<String>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(ParamValue::One),
            _ => Some(ParamValue::Many(values)),
        }
    }

    /// The value as a list, whatever its shape.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            ParamValue::One(v) => vec![v.clone()],
            ParamValue::Many(vs) => vs.clone(),
        }
    }

    fn normalize(self) -> Option<Self> {
        match self {
            ParamValue::One(v) => Some(ParamValue::One(v)),
            ParamValue::Many(vs) => Self::from_list(vs),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::One(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::One(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Many(values)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(values: &[&str]) -> Self {
        ParamValue::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Ordered key/value parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
    entries: BTreeMap<String, ParamValue>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=1&a=2&b=x%20y`. A leading `?` is ignored, `+` means space,
    /// repeated keys accumulate into a list, and a key without `=` gets an
    /// empty value.
    pub fn parse(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(raw_key)?;
            let value = decode_component(raw_value)?;
            collected.entry(key).or_default().push(value);
        }

        let entries = collected
            .into_iter()
            .filter_map(|(k, vs)| ParamValue::from_list(vs).map(|v| (k, v)))
            .collect();
        Ok(Self { entries })
    }

    /// Serialize back to `a=1&a=2&b=x%20y`, keys in order.
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        for (key, value) in &self.entries {
            let key = utf8_percent_encode(key, COMPONENT).to_string();
            for v in value.to_list() {
                pairs.push(format!("{}={}", key, utf8_percent_encode(&v, COMPONENT)));
            }
        }
        pairs.join("&")
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Set or remove a key. Returns whether the stored value changed.
    pub fn set(&mut self, key: &str, value: Option<ParamValue>) -> bool {
        match value.and_then(ParamValue::normalize) {
            Some(value) => {
                if self.entries.get(key) == Some(&value) {
                    return false;
                }
                self.entries.insert(key.to_string(), value);
                true
            }
            None => self.entries.remove(key).is_some(),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &ParamValue) -> bool) {
        self.entries.retain(|k, v| keep(k, v));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the entries whose key starts with `prefix`.
    pub fn with_prefix(&self, prefix: &str) -> QueryParams {
        let entries = self
            .entries
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        QueryParams { entries }
    }
}

/// Percent-encode a single query component.
pub fn encode_uri_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

fn decode_component(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    decode_uri_component(&spaced)
}

/// Strict percent-decoding: `%` must start a two-digit hex escape and the
/// decoded bytes must be UTF-8.
pub fn decode_uri_component(raw: &str) -> Result<String> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|e| e.iter().all(u8::is_ascii_hexdigit)) {
                return Err(FilterError::Decode {
                    key: raw.to_string(),
                    reason: format!("invalid escape at byte {}", i),
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| FilterError::Decode {
            key: raw.to_string(),
            reason: e.to_string(),
        })
}
