use jobfilter::api::FilterModel;
use jobfilter::evaluate::{check_classified_state, check_field_filters, check_result_status, show_job};
use jobfilter::model::Job;
use jobfilter::params::QueryParams;
use jobfilter::registry::{
    FilterRegistry, ALL_RESULT_STATUSES, CLASSIFIED, DEFAULT_RESULT_STATUSES, UNCLASSIFIED,
};
use jobfilter::state::FilterState;
use jobfilter::store::memory::InMemoryParamStore;
use proptest::prelude::*;
use proptest::sample::{select, subsequence};
use proptest::test_runner::Config;

fn model(query: &str) -> FilterModel<InMemoryParamStore> {
    let store = InMemoryParamStore::from_query(query).expect("query parses");
    FilterModel::with_standard_registry(store).expect("model builds")
}

fn list_query(key: &str, values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("{}={}", key, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn job_strategy() -> impl Strategy<Value = Job> {
    (
        select(ALL_RESULT_STATUSES.to_vec()),
        1_u32..=8,
        prop::option::of(select(vec!["A", "B", "C"])),
        prop::option::of(1_u32..=3),
    )
        .prop_map(|(result, classification, symbol, tier)| Job {
            result: result.to_string(),
            failure_classification_id: classification,
            job_type_symbol: symbol.map(str::to_string),
            tier,
            ..Default::default()
        })
}

fn query_strategy() -> impl Strategy<Value = String> {
    (
        subsequence(ALL_RESULT_STATUSES.to_vec(), 1..=ALL_RESULT_STATUSES.len()),
        subsequence(vec![CLASSIFIED, UNCLASSIFIED], 1..=2),
        subsequence(vec!["A", "B", "C"], 0..=3),
        subsequence(vec!["1", "2", "3"], 0..=3),
    )
        .prop_map(|(statuses, classified, symbols, tiers)| {
            [
                list_query("filter-resultStatus", &statuses),
                list_query("filter-classifiedState", &classified),
                list_query("filter-job_type_symbol", &symbols),
                list_query("filter-tier", &tiers),
            ]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("&")
        })
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn visibility_is_the_conjunction_of_its_checks(job in job_strategy(), query in query_strategy()) {
        let registry = FilterRegistry::standard();
        let params = QueryParams::parse(&query).expect("query parses");
        let state = FilterState::from_params(&params, &registry).expect("state derives");

        let status_ok = job.is_runnable()
            || (check_result_status(&job, &state) && check_classified_state(&job, &state, &registry));
        let expected = status_ok && check_field_filters(&job, &state, &registry);
        prop_assert_eq!(show_job(&job, &state, &registry), expected);
    }

    #[test]
    fn runnable_jobs_ignore_status_filters(
        statuses in subsequence(ALL_RESULT_STATUSES.to_vec(), 1..=ALL_RESULT_STATUSES.len()),
        classified in subsequence(vec![CLASSIFIED, UNCLASSIFIED], 1..=2),
        classification in 1_u32..=8,
    ) {
        let query = format!(
            "{}&{}",
            list_query("filter-resultStatus", &statuses),
            list_query("filter-classifiedState", &classified)
        );
        let m = model(&query);
        let runnable = Job {
            result: "runnable".into(),
            failure_classification_id: classification,
            ..Default::default()
        };
        prop_assert!(m.show_job(&runnable));
    }

    #[test]
    fn toggling_active_statuses_twice_restores_store(
        statuses in subsequence(DEFAULT_RESULT_STATUSES.to_vec(), 1..=DEFAULT_RESULT_STATUSES.len()),
    ) {
        let mut m = model("");
        m.toggle_result_statuses(&statuses).expect("toggle");
        m.toggle_result_statuses(&statuses).expect("toggle");
        prop_assert_eq!(m.query_string(), "");
    }

    #[test]
    fn unclassified_failures_toggle_is_an_involution(
        symbols in subsequence(vec!["A", "B", "C"], 0..=3),
        tiers in subsequence(vec!["1", "2", "3"], 0..=3),
    ) {
        let query = [
            list_query("filter-job_type_symbol", &symbols),
            list_query("filter-tier", &tiers),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("&");

        let mut m = model(&query);
        let before = m.query_string();
        m.toggle_unclassified_failures().expect("toggle");
        prop_assert!(m.is_unclassified_failures());
        m.toggle_unclassified_failures().expect("toggle");
        prop_assert_eq!(m.query_string(), before);
    }

    #[test]
    fn add_then_remove_leaves_store_unchanged(value in "[A-Za-z0-9]{1,8}") {
        let mut m = model("author=bob");
        let before = m.query_string();
        m.add_filter("job_type_symbol", &value).expect("add");
        m.remove_filter("job_type_symbol", Some(&value)).expect("remove");
        prop_assert_eq!(m.query_string(), before);
    }
}
