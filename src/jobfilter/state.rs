//! Derived filter state and its cache.
//!
//! [`FilterState`] is the working form of the persisted parameters: a pure
//! function of the store contents plus the registry defaults. The
//! [`FilterStateCache`] keeps the last derived state together with the
//! prefixed subset of parameters it was derived from, and only recomputes
//! when that subset changes by value.

use crate::error::{FilterError, Result};
use crate::params::{decode_uri_component, ParamValue, QueryParams};
use crate::registry::{FilterRegistry, CLASSIFIED_STATE, RESULT_STATUS, SEARCH_STR};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub result_statuses: Vec<String>,
    pub classified_states: Vec<String>,
    /// Field name to lowercase values. Never holds result status or
    /// classified state.
    pub field_filters: BTreeMap<String, Vec<String>>,
}

impl FilterState {
    /// State of an empty store.
    pub fn defaults(registry: &FilterRegistry) -> Self {
        let field_filters = registry
            .defaults()
            .filter(|(field, _)| !matches!(*field, RESULT_STATUS | CLASSIFIED_STATE))
            .map(|(field, values)| (field.to_string(), lowercase_all(values)))
            .collect();

        Self {
            result_statuses: stored_or_default(&QueryParams::new(), registry, RESULT_STATUS),
            classified_states: stored_or_default(&QueryParams::new(), registry, CLASSIFIED_STATE),
            field_filters,
        }
    }

    /// Derive the state from store contents. Fails only when a stored
    /// search string is not valid percent-encoding.
    pub fn from_params(params: &QueryParams, registry: &FilterRegistry) -> Result<Self> {
        let mut overlaid = params.clone();
        for (field, values) in registry.defaults() {
            let key = registry.key_for(field);
            if !overlaid.contains_key(&key) {
                overlaid.set(&key, Some(ParamValue::Many(values.to_vec())));
            }
        }

        let mut field_filters = BTreeMap::new();
        for (key, value) in overlaid.iter() {
            if !registry.is_field_filter_key(key) {
                continue;
            }
            let field = registry.field_for(key);
            let values = if field == SEARCH_STR {
                split_search_terms(key, value)?
            } else {
                lowercase_all(&value.to_list())
            };
            field_filters.insert(field.to_string(), values);
        }

        Ok(Self {
            result_statuses: stored_or_default(params, registry, RESULT_STATUS),
            classified_states: stored_or_default(params, registry, CLASSIFIED_STATE),
            field_filters,
        })
    }
}

fn stored_or_default(params: &QueryParams, registry: &FilterRegistry, field: &str) -> Vec<String> {
    match params.get(&registry.key_for(field)) {
        Some(value) => lowercase_all(&value.to_list()),
        None => lowercase_all(registry.default_values(field).unwrap_or_default()),
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

/// Search text becomes a list of terms: decoded, runs of spaces collapsed,
/// lowercased, split on single spaces.
fn split_search_terms(key: &str, value: &ParamValue) -> Result<Vec<String>> {
    let raw = value.to_list().join(" ");
    let decoded = decode_uri_component(&raw).map_err(|e| match e {
        FilterError::Decode { reason, .. } => FilterError::Decode {
            key: key.to_string(),
            reason,
        },
        other => other,
    })?;

    let mut collapsed = String::with_capacity(decoded.len());
    for c in decoded.chars() {
        if c == ' ' && collapsed.ends_with(' ') {
            continue;
        }
        collapsed.push(c);
    }

    Ok(collapsed
        .to_lowercase()
        .split(' ')
        .map(str::to_string)
        .collect())
}

/// Last derived state plus the parameters it came from.
#[derive(Debug, Clone)]
pub struct FilterStateCache {
    snapshot: Option<QueryParams>,
    state: FilterState,
}

impl FilterStateCache {
    pub fn new(registry: &FilterRegistry) -> Self {
        Self {
            snapshot: None,
            state: FilterState::defaults(registry),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Recompute if the prefixed parameters differ from the last refresh.
    /// Returns whether a recomputation happened. On error the previous state
    /// is kept.
    pub fn refresh(&mut self, params: &QueryParams, registry: &FilterRegistry) -> Result<bool> {
        let subset = params.with_prefix(registry.prefix());
        if self.snapshot.as_ref() == Some(&subset) {
            return Ok(false);
        }

        self.state = FilterState::from_params(params, registry)?;
        debug!(
            keys = subset.len(),
            fields = self.state.field_filters.len(),
            "filter state recomputed"
        );
        self.snapshot = Some(subset);
        Ok(true)
    }
}
