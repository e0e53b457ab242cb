//! Job visibility.
//!
//! A job is shown when every applicable dimension passes. Within a dimension
//! any listed value is enough, except the search string, where every term
//! has to match.
//!
//! Runnable placeholders skip the result status and classified state checks
//! so they always show up where they are scheduled, but field filters still
//! apply to them.

use crate::model::Job;
use crate::registry::{FilterRegistry, MatchType, CLASSIFIED, UNCLASSIFIED};
use crate::state::FilterState;
use tracing::trace;

impl MatchType {
    /// Compare a lowercase job value with a field's filter values.
    pub fn matches(self, filter_values: &[String], value: &str) -> bool {
        match self {
            MatchType::ExactString | MatchType::Choice => exact_match(filter_values, value),
            MatchType::Substring => any_substring(filter_values, value),
            MatchType::AllSubstrings => all_substrings(filter_values, value),
        }
    }
}

fn exact_match(filter_values: &[String], value: &str) -> bool {
    filter_values.iter().any(|v| v == value)
}

fn any_substring(filter_values: &[String], value: &str) -> bool {
    filter_values.iter().any(|v| value.contains(v.as_str()))
}

fn all_substrings(filter_values: &[String], value: &str) -> bool {
    filter_values.iter().all(|v| value.contains(v.as_str()))
}

/// Decide whether `job` is visible under `state`.
pub fn show_job(job: &Job, state: &FilterState, registry: &FilterRegistry) -> bool {
    if !job.is_runnable() {
        if !check_result_status(job, state) {
            trace!(job = job.id, status = job.result_status(), "hidden by result status");
            return false;
        }
        if !check_classified_state(job, state, registry) {
            trace!(job = job.id, "hidden by classified state");
            return false;
        }
    }
    check_field_filters(job, state, registry)
}

pub fn check_result_status(job: &Job, state: &FilterState) -> bool {
    let status = job.result_status().to_lowercase();
    state.result_statuses.iter().any(|s| *s == status)
}

/// With neither state active nothing passes.
pub fn check_classified_state(job: &Job, state: &FilterState, registry: &FilterRegistry) -> bool {
    let active = |name: &str| state.classified_states.iter().any(|s| s == name);
    let classified = job.is_classified(registry.unclassified_ids());

    if !active(UNCLASSIFIED) && !classified {
        return false;
    }
    !(!active(CLASSIFIED) && classified)
}

/// Every field filter must pass. A job without a value for a field passes
/// that field. Fields the registry does not know compare exactly.
pub fn check_field_filters(job: &Job, state: &FilterState, registry: &FilterRegistry) -> bool {
    state.field_filters.iter().all(|(field, values)| {
        let Some(value) = job.field(field) else {
            return true;
        };
        let match_type = registry
            .dimension(field)
            .map(|d| d.match_type)
            .unwrap_or(MatchType::ExactString);

        let passed = match_type.matches(values, &value.to_lowercase());
        if !passed {
            trace!(job = job.id, field = field.as_str(), "hidden by field filter");
        }
        passed
    })
}
