use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Result value of placeholder jobs that can be scheduled but have not run.
pub const RUNNABLE: &str = "runnable";

/// Job state once a result is known.
pub const COMPLETED: &str = "completed";

/// Classification id given to failures nobody has looked at yet.
pub const NOT_CLASSIFIED_ID: u32 = 1;

/// A failure classification choice, e.g. `{id: 4, name: "intermittent"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationChoice {
    pub id: u32,
    pub name: String,
}

impl ClassificationChoice {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A job record as produced by whatever fetches jobs.
///
/// Well-known fields are typed. Anything else the producer sends lands in
/// `extra` and is still reachable through [`Job::field`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default = "default_classification_id")]
    pub failure_classification_id: u32,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub platform_option: Option<String>,
    #[serde(default)]
    pub job_type_name: Option<String>,
    #[serde(default)]
    pub job_type_symbol: Option<String>,
    #[serde(default)]
    pub job_group_name: Option<String>,
    #[serde(default)]
    pub job_group_symbol: Option<String>,
    #[serde(default)]
    pub ref_data_name: Option<String>,
    #[serde(default)]
    pub build_system_type: Option<String>,
    #[serde(default)]
    pub machine_name: Option<String>,
    #[serde(default)]
    pub tier: Option<u32>,
    /// Lowercase text matched by the `searchStr` filter. Filled by
    /// [`Job::searchable`]; never computed lazily during evaluation.
    #[serde(default, rename = "searchStr")]
    pub search_str: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_classification_id() -> u32 {
    NOT_CLASSIFIED_ID
}

impl Default for Job {
    fn default() -> Self {
        Self {
            id: 0,
            result: String::new(),
            state: None,
            failure_classification_id: NOT_CLASSIFIED_ID,
            platform: None,
            platform_option: None,
            job_type_name: None,
            job_type_symbol: None,
            job_group_name: None,
            job_group_symbol: None,
            ref_data_name: None,
            build_system_type: None,
            machine_name: None,
            tier: None,
            search_str: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl Job {
    pub fn new(id: u64, result: impl Into<String>) -> Self {
        Self {
            id,
            result: result.into(),
            ..Default::default()
        }
    }

    pub fn is_runnable(&self) -> bool {
        self.result == RUNNABLE
    }

    /// The coarse status filters compare against: the result once the job
    /// completed, otherwise its state (`pending`, `running`).
    pub fn result_status(&self) -> &str {
        match self.state.as_deref() {
            None | Some(COMPLETED) => &self.result,
            Some(state) => state,
        }
    }

    pub fn is_classified(&self, unclassified_ids: &[u32]) -> bool {
        !unclassified_ids.contains(&self.failure_classification_id)
    }

    /// Platform and platform option as one string, e.g. `linux64 opt`.
    pub fn platform_label(&self) -> Option<String> {
        let platform = self.platform.as_deref()?;
        match self.platform_option.as_deref() {
            Some(option) if !option.is_empty() => Some(format!("{} {}", platform, option)),
            _ => Some(platform.to_string()),
        }
    }

    /// Read a field by name, stringified. `None` means the job has no value.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.to_string()),
            "result" => Some(self.result.clone()),
            "state" => self.state.clone(),
            "failure_classification_id" => Some(self.failure_classification_id.to_string()),
            "platform" => self.platform_label(),
            "platform_option" => self.platform_option.clone(),
            "job_type_name" => self.job_type_name.clone(),
            "job_type_symbol" => self.job_type_symbol.clone(),
            "job_group_name" => self.job_group_name.clone(),
            "job_group_symbol" => self.job_group_symbol.clone(),
            "ref_data_name" => self.ref_data_name.clone(),
            "build_system_type" => self.build_system_type.clone(),
            "machine_name" => self.machine_name.clone(),
            "tier" => self.tier.map(|t| t.to_string()),
            "searchStr" => Some(self.search_str.clone()),
            other => match self.extra.get(other) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(v) => Some(v.to_string()),
            },
        }
    }

    /// Fill `search_str` from the descriptive fields if the producer left it
    /// empty.
    pub fn searchable(mut self) -> Self {
        if self.search_str.is_empty() {
            self.search_str = self.build_search_str();
        }
        self
    }

    fn build_search_str(&self) -> String {
        let parts = [
            self.platform_label(),
            self.job_group_name.clone(),
            self.job_group_symbol.clone(),
            self.job_type_name.clone(),
            self.job_type_symbol.clone(),
            self.ref_data_name.clone(),
            self.field("signature"),
        ];
        parts
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// Parse a JSON array of jobs and precompute their search strings.
pub fn parse_jobs(json: &str) -> Result<Vec<Job>> {
    let jobs: Vec<Job> = serde_json::from_str(json)?;
    Ok(jobs.into_iter().map(Job::searchable).collect())
}
