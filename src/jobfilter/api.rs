//! # API Facade
//!
//! [`FilterModel`] is the single entry point for UIs: it answers "is this job
//! visible?" and "what are the current filters?", turns filter intents into
//! store writes, and reacts when the store changes.
//!
//! ## Digest Cycle
//!
//! The model never patches its derived state in place. After a write (its
//! own or anyone else's) [`FilterModel::digest`] runs:
//!
//! 1. ask the store whether it changed since the last digest;
//! 2. if so, compare the prefixed parameters with the last snapshot;
//! 3. if those differ, recompute [`FilterState`] and emit
//!    [`FilterEvent::FiltersChanged`].
//!
//! Single-intent methods (`add_filter`, `toggle_result_statuses`, ...) digest
//! right after their write. [`FilterModel::toggle_filters`] digests once after
//! the whole batch, so listeners see one change and `show_job` answers from
//! the pre-batch state until then.
//!
//! ## Generic Over ParamStore
//!
//! `FilterModel<S: ParamStore>` works with any store:
//! - `FilterModel<InMemoryParamStore>` owns its parameters
//! - `FilterModel<&mut T>` borrows a store owned elsewhere
//!
//! External writers go through [`FilterModel::store_mut`] and call
//! [`FilterModel::digest`] when they are done.

use crate::error::Result;
use crate::evaluate;
use crate::model::Job;
use crate::mutate::{self, FilterMutator};
use crate::notify::{ChangeNotifier, FilterEvent, SubscriptionId};
use crate::params::{decode_uri_component, ParamValue};
use crate::registry::{FilterRegistry, SEARCH_STR};
use crate::state::{FilterState, FilterStateCache};
use crate::store::ParamStore;
use serde::Serialize;
use tracing::debug;

/// An active field filter value, ready to be shown as a removable chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFilterEntry {
    pub field: String,
    pub field_name: String,
    pub key: String,
    pub value: String,
    pub display_value: String,
}

/// A non-field filter present in the store, e.g. `author`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonFieldFilterEntry {
    pub field: String,
    pub value: String,
}

pub struct FilterModel<S: ParamStore> {
    store: S,
    registry: FilterRegistry,
    cache: FilterStateCache,
    notifier: ChangeNotifier,
    /// A store change whose refresh failed and has to be retried.
    pending: bool,
}

impl<S: ParamStore> FilterModel<S> {
    /// Build a model and derive the initial state from the store.
    pub fn new(mut store: S, registry: FilterRegistry) -> Result<Self> {
        let mut cache = FilterStateCache::new(&registry);
        cache.refresh(store.read(), &registry)?;
        store.take_change();
        Ok(Self {
            store,
            registry,
            cache,
            notifier: ChangeNotifier::new(),
            pending: false,
        })
    }

    pub fn with_standard_registry(store: S) -> Result<Self> {
        Self::new(store, FilterRegistry::standard())
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn state(&self) -> &FilterState {
        self.cache.state()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access for external writers. Call [`Self::digest`]
    /// afterwards.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(FilterEvent, &FilterState) + 'static,
    ) -> SubscriptionId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// React to a store change. Returns whether the derived state was
    /// recomputed (and listeners notified). A change whose refresh fails
    /// stays pending, so the next digest retries it.
    pub fn digest(&mut self) -> Result<bool> {
        let changed = self.store.take_change();
        if !changed && !self.pending {
            return Ok(false);
        }
        self.pending = true;
        let recomputed = self.cache.refresh(self.store.read(), &self.registry)?;
        self.pending = false;
        if recomputed {
            debug!(
                listeners = self.notifier.listener_count(),
                "filters changed"
            );
            self.notifier
                .emit(FilterEvent::FiltersChanged, self.cache.state());
        }
        Ok(recomputed)
    }

    // --- Evaluation ---

    pub fn show_job(&self, job: &Job) -> bool {
        evaluate::show_job(job, self.cache.state(), &self.registry)
    }

    pub fn visible_jobs<'a>(&self, jobs: &'a [Job]) -> Vec<&'a Job> {
        jobs.iter().filter(|job| self.show_job(job)).collect()
    }

    // --- Readers ---

    pub fn result_statuses(&self) -> &[String] {
        &self.state().result_statuses
    }

    pub fn classified_states(&self) -> &[String] {
        &self.state().classified_states
    }

    pub fn is_unclassified_failures(&self) -> bool {
        mutate::is_unclassified_failures(self.store.read(), &self.registry)
    }

    /// Field filters explicitly present in the store, one entry per value.
    /// Search text is given back as plain text.
    pub fn field_filter_entries(&self) -> Vec<FieldFilterEntry> {
        let mut entries = Vec::new();
        for (key, value) in self.store.read().iter() {
            if !self.registry.is_field_filter_key(key) {
                continue;
            }
            let field = self.registry.field_for(key);
            let dimension = self.registry.dimension(field);
            for v in value.to_list() {
                let v = if field == SEARCH_STR {
                    decode_uri_component(&v).unwrap_or(v)
                } else {
                    v
                };
                entries.push(FieldFilterEntry {
                    field: field.to_string(),
                    field_name: dimension
                        .map(|d| d.display_name.to_string())
                        .unwrap_or_else(|| field.to_string()),
                    key: key.to_string(),
                    display_value: dimension
                        .map(|d| d.display_value(&v))
                        .unwrap_or_else(|| v.clone()),
                    value: v,
                });
            }
        }
        entries
    }

    pub fn non_field_filter_entries(&self) -> Vec<NonFieldFilterEntry> {
        self.store
            .read()
            .iter()
            .filter(|(key, _)| self.registry.is_non_field_filter(key))
            .flat_map(|(key, value)| {
                value.to_list().into_iter().map(move |v| NonFieldFilterEntry {
                    field: key.to_string(),
                    value: v,
                })
            })
            .collect()
    }

    pub fn query_string(&self) -> String {
        self.store.read().to_query_string()
    }

    // --- Mutations ---

    pub fn add_filter(&mut self, field: &str, value: &str) -> Result<bool> {
        self.mutator().add_filter(field, value);
        self.digest()
    }

    pub fn remove_filter(&mut self, field: &str, value: Option<&str>) -> Result<bool> {
        self.mutator().remove_filter(field, value);
        self.digest()
    }

    pub fn replace_filter(&mut self, field: &str, value: impl Into<ParamValue>) -> Result<bool> {
        self.mutator().replace_filter(field, value);
        self.digest()
    }

    pub fn remove_all_field_filters(&mut self) -> Result<bool> {
        self.mutator().remove_all_field_filters();
        self.digest()
    }

    pub fn reset_non_field_filters(&mut self) -> Result<bool> {
        self.mutator().reset_non_field_filters();
        self.digest()
    }

    pub fn clear_all_filters(&mut self) -> Result<bool> {
        self.mutator().clear_all_filters();
        self.digest()
    }

    /// Add or remove each value, then digest once for the whole batch.
    pub fn toggle_filters(&mut self, field: &str, values: &[&str], add: bool) -> Result<bool> {
        self.mutator().toggle_filters(field, values, add);
        self.digest()
    }

    pub fn toggle_result_statuses(&mut self, statuses: &[&str]) -> Result<bool> {
        self.mutator().toggle_result_statuses(statuses);
        self.digest()
    }

    pub fn toggle_in_progress(&mut self) -> Result<bool> {
        self.mutator().toggle_in_progress();
        self.digest()
    }

    pub fn toggle_classified_state(&mut self, state: &str) -> Result<bool> {
        self.mutator().toggle_classified_state(state);
        self.digest()
    }

    pub fn set_only_unclassified_failures(&mut self) -> Result<bool> {
        self.mutator().set_only_unclassified_failures();
        self.digest()
    }

    pub fn set_only_superseded(&mut self) -> Result<bool> {
        self.mutator().set_only_superseded();
        self.digest()
    }

    pub fn toggle_unclassified_failures(&mut self) -> Result<bool> {
        self.mutator().toggle_unclassified_failures();
        self.digest()
    }

    fn mutator(&mut self) -> FilterMutator<'_, S> {
        FilterMutator::new(&mut self.store, &self.registry)
    }
}
