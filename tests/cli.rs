use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

const JOBS: &str = r#"[
  {"id": 101, "result": "success", "state": "completed", "job_type_symbol": "B",
   "job_type_name": "build-linux64/opt", "platform": "linux64", "platform_option": "opt"},
  {"id": 102, "result": "success", "state": "completed", "job_type_symbol": "C",
   "job_type_name": "test-linux64/opt-crashtest", "platform": "linux64", "platform_option": "opt"},
  {"id": 103, "result": "testfailed", "state": "completed", "job_type_symbol": "B",
   "failure_classification_id": 4, "job_type_name": "build-win64/debug", "platform": "windows11-64"}
]"#;

/// A command isolated from the user's config and colors.
fn jobfilter(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("jobfilter").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_add_prints_resulting_query() {
    let temp_dir = tempfile::tempdir().unwrap();
    jobfilter(temp_dir.path())
        .args(["add", "job_type_symbol", "B"])
        .assert()
        .success()
        .stdout("filter-job_type_symbol=B\n");
}

#[test]
fn test_add_extends_default_tiers() {
    let temp_dir = tempfile::tempdir().unwrap();
    jobfilter(temp_dir.path())
        .args(["add", "tier", "3"])
        .assert()
        .success()
        .stdout("filter-tier=1&filter-tier=2&filter-tier=3\n");
}

#[test]
fn test_remove_last_value_empties_query() {
    let temp_dir = tempfile::tempdir().unwrap();
    jobfilter(temp_dir.path())
        .args(["--query", "filter-job_type_symbol=B&author=bob"])
        .args(["remove", "job_type_symbol", "B"])
        .assert()
        .success()
        .stdout("author=bob\n");
}

#[test]
fn test_toggle_status_group() {
    let temp_dir = tempfile::tempdir().unwrap();
    jobfilter(temp_dir.path())
        .args(["toggle-status", "in-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("filter-resultStatus=testfailed"))
        .stdout(predicate::str::contains("pending").not())
        .stdout(predicate::str::contains("running").not());
}

#[test]
fn test_toggle_status_rejects_unknown() {
    let temp_dir = tempfile::tempdir().unwrap();
    jobfilter(temp_dir.path())
        .args(["toggle-status", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown result status: bogus"));
}

#[test]
fn test_unclassified_toggles_back() {
    let temp_dir = tempfile::tempdir().unwrap();
    jobfilter(temp_dir.path())
        .args(["--query", "filter-tier=3", "unclassified"])
        .assert()
        .success()
        .stdout(predicate::str::contains("filter-classifiedState=unclassified"))
        .stdout(predicate::str::contains("filter-resultStatus=busted"))
        .stdout(predicate::str::contains("filter-tier=3"));

    jobfilter(temp_dir.path())
        .args(["--query"])
        .arg(
            "filter-classifiedState=unclassified&filter-resultStatus=testfailed\
             &filter-resultStatus=busted&filter-resultStatus=exception&filter-tier=3",
        )
        .arg("unclassified")
        .assert()
        .success()
        .stdout("filter-tier=3\n");
}

#[test]
fn test_show_lists_visible_jobs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let jobs = temp_dir.path().join("jobs.json");
    std::fs::write(&jobs, JOBS).unwrap();

    jobfilter(temp_dir.path())
        .args(["--query", "filter-job_type_symbol=B", "show"])
        .arg(&jobs)
        .assert()
        .success()
        .stdout(predicate::str::contains("101"))
        .stdout(predicate::str::contains("103"))
        .stdout(predicate::str::contains("102").not())
        .stdout(predicate::str::contains("2 of 3 jobs shown"));

    jobfilter(temp_dir.path())
        .args(["--query", "filter-job_type_symbol=B", "show", "--all"])
        .arg(&jobs)
        .assert()
        .success()
        .stdout(predicate::str::contains("102"));
}

#[test]
fn test_show_search_terms() {
    let temp_dir = tempfile::tempdir().unwrap();
    let jobs = temp_dir.path().join("jobs.json");
    std::fs::write(&jobs, JOBS).unwrap();

    jobfilter(temp_dir.path())
        .args(["--query", "filter-searchStr=linux64%2520crashtest", "show"])
        .arg(&jobs)
        .assert()
        .success()
        .stdout(predicate::str::contains("102"))
        .stdout(predicate::str::contains("1 of 3 jobs shown"));
}

#[test]
fn test_malformed_search_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    jobfilter(temp_dir.path())
        .args(["--query", "filter-searchStr=bad%25", "state"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed encoding"));
}

#[test]
fn test_state_prints_json() {
    let temp_dir = tempfile::tempdir().unwrap();
    jobfilter(temp_dir.path())
        .args(["--query", "filter-resultStatus=busted", "state"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"result_statuses\""))
        .stdout(predicate::str::contains("\"busted\""));
}

#[test]
fn test_fields_and_filters() {
    let temp_dir = tempfile::tempdir().unwrap();
    jobfilter(temp_dir.path())
        .arg("fields")
        .assert()
        .success()
        .stdout(predicate::str::contains("job_type_symbol"))
        .stdout(predicate::str::contains("intermittent"));

    jobfilter(temp_dir.path())
        .args(["--query", "filter-failure_classification_id=4&author=bob", "filters"])
        .assert()
        .success()
        .stdout(predicate::str::contains("failure classification"))
        .stdout(predicate::str::contains("intermittent"))
        .stdout(predicate::str::contains("bob"));

    jobfilter(temp_dir.path())
        .arg("filters")
        .assert()
        .success()
        .stdout(predicate::str::contains("No active filters."));
}

#[test]
fn test_custom_config_prefix() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("custom.json");
    std::fs::write(&config, r#"{"prefix": "f_", "default_tiers": ["1"]}"#).unwrap();

    jobfilter(temp_dir.path())
        .arg("--config")
        .arg(&config)
        .args(["add", "tier", "2"])
        .assert()
        .success()
        .stdout("f_tier=1&f_tier=2\n");
}

#[test]
fn test_missing_config_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    jobfilter(temp_dir.path())
        .arg("--config")
        .arg(temp_dir.path().join("nope.json"))
        .arg("state")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
