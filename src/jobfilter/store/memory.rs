use super::ParamStore;
use crate::error::Result;
use crate::params::{ParamValue, QueryParams};
use tracing::trace;

/// Query parameters held in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryParamStore {
    params: QueryParams,
    changed: bool,
}

impl InMemoryParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: QueryParams) -> Self {
        Self {
            params,
            changed: false,
        }
    }

    pub fn from_query(query: &str) -> Result<Self> {
        Ok(Self::with_params(QueryParams::parse(query)?))
    }

    pub fn query_string(&self) -> String {
        self.params.to_query_string()
    }
}

impl ParamStore for InMemoryParamStore {
    fn read(&self) -> &QueryParams {
        &self.params
    }

    fn write(&mut self, key: &str, value: Option<ParamValue>) -> bool {
        let changed = self.params.set(key, value);
        if changed {
            trace!(key, "param written");
            self.changed = true;
        }
        changed
    }

    fn replace_all(&mut self, params: QueryParams) -> bool {
        if self.params == params {
            return false;
        }
        trace!(keys = params.len(), "params replaced");
        self.params = params;
        self.changed = true;
        true
    }

    fn take_change(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    pub struct StoreFixture {
        pub store: InMemoryParamStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryParamStore::new(),
            }
        }

        pub fn with_param(mut self, key: &str, value: &str) -> Self {
            self.store.params.set(key, Some(value.into()));
            self
        }

        pub fn with_list(mut self, key: &str, values: &[&str]) -> Self {
            self.store.params.set(key, Some(values.into()));
            self
        }

        pub fn build(self) -> InMemoryParamStore {
            self.store
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;

    #[test]
    fn write_marks_change_once() {
        let mut store = InMemoryParamStore::new();
        assert!(!store.take_change());

        assert!(store.write("filter-tier", Some("1".into())));
        assert!(store.write("filter-tier", Some("3".into())));
        assert!(store.take_change());
        assert!(!store.take_change());
    }

    #[test]
    fn equal_write_is_not_a_change() {
        let mut store = StoreFixture::new().with_param("author", "bob").build();
        assert!(!store.write("author", Some("bob".into())));
        assert!(!store.write("missing", None));
        assert!(!store.take_change());
    }

    #[test]
    fn replace_all_detects_equal_contents() {
        let mut store = StoreFixture::new()
            .with_list("filter-tier", &["1", "3"])
            .build();
        let same = store.read().clone();
        assert!(!store.replace_all(same));
        assert!(store.replace_all(QueryParams::new()));
        assert!(store.take_change());
        assert!(store.read().is_empty());
    }

    #[test]
    fn fixtures_do_not_mark_change() {
        let mut store = StoreFixture::default()
            .with_param("filter-resultStatus", "success")
            .build();
        assert!(!store.take_change());
        assert_eq!(store.query_string(), "filter-resultStatus=success");
    }

    #[test]
    fn borrowed_store_writes_through() {
        fn clear_author<S: ParamStore>(mut store: S) {
            store.write("author", None);
        }

        let mut store = InMemoryParamStore::from_query("author=bob").unwrap();
        clear_author(&mut store);
        assert!(store.read().is_empty());
        assert!(store.take_change());
    }
}
