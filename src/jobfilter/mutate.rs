//! Filter intents turned into store writes.
//!
//! Every operation reads the live store (never the derived cache), computes
//! the new value and writes it. A value that equals the field's defaults is
//! removed instead of stored, and so is an empty list. Nothing here
//! recomputes derived state; the owner digests the store's change afterwards.
//!
//! Search text is decoded once more when the state is derived, so it is
//! written percent-encoded. Callers always pass and get plain text.

use crate::params::{encode_uri_component, ParamValue, QueryParams};
use crate::registry::{
    FilterRegistry, CLASSIFIED_STATE, FAILURE_RESULTS, IN_PROGRESS_RESULTS, RESULT_STATUS,
    SEARCH_STR, SUPERSEDED, UNCLASSIFIED,
};
use crate::store::ParamStore;
use std::collections::BTreeSet;
use tracing::debug;

pub struct FilterMutator<'a, S: ParamStore> {
    store: &'a mut S,
    registry: &'a FilterRegistry,
}

impl<'a, S: ParamStore> FilterMutator<'a, S> {
    pub fn new(store: &'a mut S, registry: &'a FilterRegistry) -> Self {
        Self { store, registry }
    }

    /// Stored values for a field, else its defaults, else nothing.
    pub fn values_or_defaults(&self, field: &str) -> Vec<String> {
        let key = self.registry.key_for(field);
        match self.store.read().get(&key) {
            Some(value) => value.to_list(),
            None => self
                .registry
                .default_values(self.registry.field_for(&key))
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        }
    }

    pub fn add_filter(&mut self, field: &str, value: &str) -> bool {
        let value = self.stored_form(field, value);
        let value = value.as_str();
        let current = self.values_or_defaults(field);
        let values = if !self.registry.is_non_field_filter(field) && !current.is_empty() {
            let mut values = current;
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
            values
        } else {
            vec![value.to_string()]
        };
        debug!(field, value, "add filter");
        self.write_collapsed(field, values)
    }

    /// Remove one value, or the whole field when `value` is `None`.
    pub fn remove_filter(&mut self, field: &str, value: Option<&str>) -> bool {
        debug!(field, value, "remove filter");
        let Some(value) = value else {
            let key = self.registry.key_for(field);
            return self.store.write(&key, None);
        };
        let value = self.stored_form(field, value);
        let remaining = self
            .values_or_defaults(field)
            .into_iter()
            .filter(|v| *v != value)
            .collect();
        self.write_collapsed(field, remaining)
    }

    /// Overwrite as given: no list merge, no default collapsing.
    pub fn replace_filter(&mut self, field: &str, value: impl Into<ParamValue>) -> bool {
        let key = self.registry.key_for(field);
        let values = value
            .into()
            .to_list()
            .iter()
            .map(|v| self.stored_form(field, v))
            .collect();
        self.store.write(&key, ParamValue::from_list(values))
    }

    pub fn remove_all_field_filters(&mut self) -> bool {
        let mut params = self.store.read().clone();
        params.retain(|key, _| !self.registry.is_field_filter_key(key));
        self.store.replace_all(params)
    }

    pub fn reset_non_field_filters(&mut self) -> bool {
        let mut params = self.store.read().clone();
        params.remove(&self.registry.key_for(RESULT_STATUS));
        params.remove(&self.registry.key_for(CLASSIFIED_STATE));
        self.store.replace_all(params)
    }

    /// Remove every prefixed key, statuses included.
    pub fn clear_all_filters(&mut self) -> bool {
        let mut params = self.store.read().clone();
        params.retain(|key, _| !self.registry.is_prefixed(key));
        self.store.replace_all(params)
    }

    pub fn toggle_filters(&mut self, field: &str, values: &[&str], add: bool) -> bool {
        let mut changed = false;
        for &value in values {
            changed |= if add {
                self.add_filter(field, value)
            } else {
                self.remove_filter(field, Some(value))
            };
        }
        changed
    }

    /// Remove the statuses if all of them are active, otherwise add them.
    pub fn toggle_result_statuses(&mut self, statuses: &[&str]) -> bool {
        let current = self.values_or_defaults(RESULT_STATUS);
        let all_active = statuses.iter().all(|s| current.iter().any(|c| c == s));

        let values = if all_active {
            current
                .into_iter()
                .filter(|c| !statuses.contains(&c.as_str()))
                .collect()
        } else {
            let mut values = current;
            for status in statuses {
                if !values.iter().any(|v| v == status) {
                    values.push(status.to_string());
                }
            }
            values
        };
        self.write_collapsed(RESULT_STATUS, values)
    }

    pub fn toggle_in_progress(&mut self) -> bool {
        self.toggle_result_statuses(IN_PROGRESS_RESULTS)
    }

    pub fn toggle_classified_state(&mut self, state: &str) -> bool {
        if self.values_or_defaults(CLASSIFIED_STATE).iter().any(|s| s == state) {
            self.remove_filter(CLASSIFIED_STATE, Some(state))
        } else {
            self.add_filter(CLASSIFIED_STATE, state)
        }
    }

    pub fn set_only_unclassified_failures(&mut self) -> bool {
        let mut params = self.store.read().clone();
        params.set(
            &self.registry.key_for(RESULT_STATUS),
            Some(ParamValue::from(FAILURE_RESULTS)),
        );
        params.set(
            &self.registry.key_for(CLASSIFIED_STATE),
            Some(UNCLASSIFIED.into()),
        );
        self.store.replace_all(params)
    }

    pub fn set_only_superseded(&mut self) -> bool {
        let mut params = self.store.read().clone();
        params.set(&self.registry.key_for(RESULT_STATUS), Some(SUPERSEDED.into()));
        params.remove(&self.registry.key_for(CLASSIFIED_STATE));
        self.store.replace_all(params)
    }

    pub fn is_unclassified_failures(&self) -> bool {
        is_unclassified_failures(self.store.read(), self.registry)
    }

    pub fn toggle_unclassified_failures(&mut self) -> bool {
        if self.is_unclassified_failures() {
            self.reset_non_field_filters()
        } else {
            self.set_only_unclassified_failures()
        }
    }

    /// The form a value is persisted in.
    fn stored_form(&self, field: &str, value: &str) -> String {
        if self.registry.field_for(field) == SEARCH_STR {
            encode_uri_component(value)
        } else {
            value.to_string()
        }
    }

    fn write_collapsed(&mut self, field: &str, values: Vec<String>) -> bool {
        let key = self.registry.key_for(field);
        let value = if values.is_empty() || self.registry.matches_defaults(&key, &values) {
            None
        } else {
            ParamValue::from_list(values)
        };
        self.store.write(&key, value)
    }
}

/// Whether `params` hold exactly the unclassified failures configuration,
/// compared as sets.
pub fn is_unclassified_failures(params: &QueryParams, registry: &FilterRegistry) -> bool {
    let stored = |field: &str| -> Option<BTreeSet<String>> {
        let value = params.get(&registry.key_for(field))?;
        Some(value.to_list().into_iter().collect())
    };
    let failures: BTreeSet<String> = FAILURE_RESULTS.iter().map(|s| s.to_string()).collect();
    let unclassified: BTreeSet<String> = [UNCLASSIFIED.to_string()].into_iter().collect();

    stored(RESULT_STATUS) == Some(failures) && stored(CLASSIFIED_STATE) == Some(unclassified)
}
