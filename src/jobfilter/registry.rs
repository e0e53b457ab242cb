//! Filter dimension registry.
//!
//! This module describes every dimension jobs can be filtered on: the key it
//! is persisted under, how it is shown to people, and how its values are
//! matched against a job. It also owns the defaults that apply when the
//! store says nothing about a dimension.

use crate::model::ClassificationChoice;
use std::collections::{BTreeMap, BTreeSet};

/// Prefix carried by every persisted key except the non-field filters.
pub const FILTER_PREFIX: &str = "filter-";

pub const RESULT_STATUS: &str = "resultStatus";
pub const CLASSIFIED_STATE: &str = "classifiedState";
pub const SEARCH_STR: &str = "searchStr";
pub const TIER: &str = "tier";
pub const FAILURE_CLASSIFICATION_ID: &str = "failure_classification_id";

pub const CLASSIFIED: &str = "classified";
pub const UNCLASSIFIED: &str = "unclassified";

/// Single-value parameters stored without the prefix.
pub const NON_FIELD_FILTERS: &[&str] = &[
    "fromchange",
    "tochange",
    "author",
    "nojobs",
    "startdate",
    "enddate",
    "revision",
];

pub const ALL_RESULT_STATUSES: &[&str] = &[
    "testfailed",
    "busted",
    "exception",
    "success",
    "retry",
    "usercancel",
    "running",
    "pending",
    "superseded",
    "runnable",
];

/// Everything but `superseded`.
pub const DEFAULT_RESULT_STATUSES: &[&str] = &[
    "testfailed",
    "busted",
    "exception",
    "success",
    "retry",
    "usercancel",
    "running",
    "pending",
    "runnable",
];

pub const FAILURE_RESULTS: &[&str] = &["testfailed", "busted", "exception"];
pub const NON_FAILURE_RESULTS: &[&str] = &["success", "retry", "usercancel", "superseded"];
pub const IN_PROGRESS_RESULTS: &[&str] = &["pending", "running"];
pub const SUPERSEDED: &str = "superseded";

pub const DEFAULT_CLASSIFIED_STATES: &[&str] = &[CLASSIFIED, UNCLASSIFIED];
pub const DEFAULT_TIERS: &[&str] = &["1", "2"];

/// `not classified` and `autoclassified intermittent`.
pub const UNCLASSIFIED_IDS: &[u32] = &[1, 7];

/// How filter values are compared with a job's field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// The value must equal one of the filter values.
    ExactString,
    /// Any filter value must occur inside the value.
    Substring,
    /// Every filter value must occur inside the value (search terms).
    AllSubstrings,
    /// The value is a choice id and must equal one of the filter values.
    Choice,
}

/// A single filterable dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDimension {
    pub name: &'static str,
    pub display_name: &'static str,
    pub match_type: MatchType,
    pub choices: Vec<ClassificationChoice>,
}

impl FilterDimension {
    fn new(name: &'static str, display_name: &'static str, match_type: MatchType) -> Self {
        Self {
            name,
            display_name,
            match_type,
            choices: Vec::new(),
        }
    }

    fn with_choices(mut self, choices: Vec<ClassificationChoice>) -> Self {
        self.choices = choices;
        self
    }

    /// Human readable form of a stored value: choice ids map to their names.
    pub fn display_value(&self, value: &str) -> String {
        if self.match_type == MatchType::Choice {
            if let Some(choice) = self
                .choices
                .iter()
                .find(|c| c.id.to_string() == value.trim())
            {
                return choice.name.clone();
            }
        }
        value.to_string()
    }
}

const DIMENSIONS: &[(&str, &str, MatchType)] = &[
    ("ref_data_name", "buildername/jobname", MatchType::Substring),
    ("build_system_type", "build system", MatchType::Substring),
    ("job_type_name", "job name", MatchType::Substring),
    ("job_type_symbol", "job symbol", MatchType::ExactString),
    ("job_group_name", "group name", MatchType::Substring),
    ("job_group_symbol", "group symbol", MatchType::ExactString),
    ("machine_name", "machine name", MatchType::Substring),
    ("platform", "platform", MatchType::Substring),
    (TIER, "tier", MatchType::ExactString),
    (
        FAILURE_CLASSIFICATION_ID,
        "failure classification",
        MatchType::Choice,
    ),
    (SEARCH_STR, "search string", MatchType::AllSubstrings),
];

/// The standard failure classifications.
pub fn default_classifications() -> Vec<ClassificationChoice> {
    vec![
        ClassificationChoice::new(1, "not classified"),
        ClassificationChoice::new(2, "fixed by commit"),
        ClassificationChoice::new(3, "expected fail"),
        ClassificationChoice::new(4, "intermittent"),
        ClassificationChoice::new(5, "infra"),
        ClassificationChoice::new(6, "intermittent needs filing"),
        ClassificationChoice::new(7, "autoclassified intermittent"),
        ClassificationChoice::new(8, "new failure not classified"),
    ]
}

/// Registry of filter dimensions plus the defaults and key conventions that
/// go with them. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRegistry {
    prefix: String,
    dimensions: Vec<FilterDimension>,
    defaults: BTreeMap<String, Vec<String>>,
    unclassified_ids: Vec<u32>,
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FilterRegistry {
    pub fn standard() -> Self {
        Self::new(
            FILTER_PREFIX,
            default_classifications(),
            to_strings(DEFAULT_RESULT_STATUSES),
            to_strings(DEFAULT_TIERS),
            UNCLASSIFIED_IDS.to_vec(),
        )
    }

    pub fn new(
        prefix: &str,
        classifications: Vec<ClassificationChoice>,
        default_result_statuses: Vec<String>,
        default_tiers: Vec<String>,
        unclassified_ids: Vec<u32>,
    ) -> Self {
        let dimensions = DIMENSIONS
            .iter()
            .map(|&(name, display, match_type)| {
                let dim = FilterDimension::new(name, display, match_type);
                if match_type == MatchType::Choice {
                    dim.with_choices(classifications.clone())
                } else {
                    dim
                }
            })
            .collect();

        let mut defaults = BTreeMap::new();
        defaults.insert(RESULT_STATUS.to_string(), default_result_statuses);
        defaults.insert(
            CLASSIFIED_STATE.to_string(),
            to_strings(DEFAULT_CLASSIFIED_STATES),
        );
        if !default_tiers.is_empty() {
            defaults.insert(TIER.to_string(), default_tiers);
        }

        Self {
            prefix: prefix.to_string(),
            dimensions,
            defaults,
            unclassified_ids,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn dimensions(&self) -> &[FilterDimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&FilterDimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn unclassified_ids(&self) -> &[u32] {
        &self.unclassified_ids
    }

    /// Default values for a field, if it has any.
    pub fn default_values(&self, field: &str) -> Option<&[String]> {
        self.defaults.get(field).map(Vec::as_slice)
    }

    /// Fields with defaults and their values.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_non_field_filter(&self, field: &str) -> bool {
        NON_FIELD_FILTERS.contains(&field)
    }

    /// The key a field is persisted under.
    pub fn key_for(&self, field: &str) -> String {
        if self.is_non_field_filter(field) || field.starts_with(&self.prefix) {
            field.to_string()
        } else {
            format!("{}{}", self.prefix, field)
        }
    }

    /// The field a persisted key belongs to.
    pub fn field_for<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.prefix.as_str()).unwrap_or(key)
    }

    pub fn is_prefixed(&self, key: &str) -> bool {
        key.starts_with(&self.prefix)
    }

    /// True for prefixed keys other than result status and classified state.
    pub fn is_field_filter_key(&self, key: &str) -> bool {
        self.is_prefixed(key)
            && !matches!(self.field_for(key), RESULT_STATUS | CLASSIFIED_STATE)
    }

    /// Whether `values` equals the field's default set, ignoring order and
    /// duplicates. Fields without defaults never match.
    pub fn matches_defaults(&self, field: &str, values: &[String]) -> bool {
        let Some(defaults) = self.default_values(self.field_for(field)) else {
            return false;
        };
        let wanted: BTreeSet<&str> = defaults.iter().map(String::as_str).collect();
        let given: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        wanted == given
    }

    /// Named groups of result statuses toggled together.
    pub fn status_group(name: &str) -> Option<&'static [&'static str]> {
        match name {
            "failures" => Some(FAILURE_RESULTS),
            "nonfailures" => Some(NON_FAILURE_RESULTS),
            "in progress" | "in-progress" => Some(IN_PROGRESS_RESULTS),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_has_expected_dimensions() {
        let registry = FilterRegistry::standard();
        for name in ["job_type_name", "job_type_symbol", "platform", "tier", "searchStr"] {
            assert!(registry.dimension(name).is_some(), "missing {}", name);
        }
        assert!(registry.dimension("nonexistent").is_none());
    }

    #[test]
    fn match_types_are_correct() {
        let registry = FilterRegistry::standard();
        let kind = |name| registry.dimension(name).unwrap().match_type;
        assert_eq!(kind("job_type_name"), MatchType::Substring);
        assert_eq!(kind("job_type_symbol"), MatchType::ExactString);
        assert_eq!(kind("searchStr"), MatchType::AllSubstrings);
        assert_eq!(kind("failure_classification_id"), MatchType::Choice);
    }

    #[test]
    fn choice_dimension_displays_names() {
        let registry = FilterRegistry::standard();
        let dim = registry.dimension(FAILURE_CLASSIFICATION_ID).unwrap();
        assert_eq!(dim.display_value("4"), "intermittent");
        assert_eq!(dim.display_value("99"), "99");

        let tier = registry.dimension(TIER).unwrap();
        assert_eq!(tier.display_value("4"), "4");
    }

    #[test]
    fn keys_carry_prefix_except_non_field_filters() {
        let registry = FilterRegistry::standard();
        assert_eq!(registry.key_for("tier"), "filter-tier");
        assert_eq!(registry.key_for("filter-tier"), "filter-tier");
        assert_eq!(registry.key_for("author"), "author");
        assert_eq!(registry.field_for("filter-tier"), "tier");
        assert_eq!(registry.field_for("author"), "author");
    }

    #[test]
    fn field_filter_keys_exclude_status_keys() {
        let registry = FilterRegistry::standard();
        assert!(registry.is_field_filter_key("filter-tier"));
        assert!(!registry.is_field_filter_key("filter-resultStatus"));
        assert!(!registry.is_field_filter_key("filter-classifiedState"));
        assert!(!registry.is_field_filter_key("author"));
    }

    #[test]
    fn defaults_compare_as_sets() {
        let registry = FilterRegistry::standard();
        assert!(registry.matches_defaults("tier", &to_strings(&["2", "1"])));
        assert!(registry.matches_defaults("tier", &to_strings(&["1", "2", "1"])));
        assert!(!registry.matches_defaults("tier", &to_strings(&["1"])));
        assert!(!registry.matches_defaults("job_type_name", &to_strings(&["1", "2"])));
    }

    #[test]
    fn status_groups() {
        assert_eq!(FilterRegistry::status_group("failures"), Some(FAILURE_RESULTS));
        assert_eq!(
            FilterRegistry::status_group("in-progress"),
            Some(IN_PROGRESS_RESULTS)
        );
        assert_eq!(FilterRegistry::status_group("bogus"), None);
    }
}
