//! Resource-Mapping Store (C2): the runtime table from step ids to
//! extracted resource identifiers, shared across all of a plan's steps
//! (spec §3 "Resource mapping", §4.6, §5).

use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::instrument;

/// `RwLock`-guarded map from step id (optionally `.index` or
/// `.sibling_key` suffixed) to a resolved JSON value. Owns the only
/// writer/reader lock C2 is specified to have (spec §5: "each
/// protected by its own reader/writer mutex").
#[derive(Default)]
pub struct ResourceMappingStore {
    inner: RwLock<HashMap<String, serde_json::Value>>,
}

impl ResourceMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self, value), fields(key))]
    pub async fn insert(&self, key: impl Into<String>, value: serde_json::Value) {
        self.inner.write().await.insert(key.into(), value);
    }

    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.read().await.get(key).cloned()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.read().await.contains_key(key)
    }

    /// Store a single `create` step's extracted scalar id under its
    /// bare step id — the write-once-per-key invariant from spec §3.
    pub async fn insert_scalar(&self, step_id: &str, id: impl Into<String>) {
        self.insert(step_id.to_string(), serde_json::Value::String(id.into()))
            .await;
    }

    /// Store an `api_value_retrieval` result. `value` is stored whole
    /// (as a JSON-encoded array, if an array) under the bare step id;
    /// array elements are additionally stored indexed so
    /// `{{step}}[i] == {{step.i}}` (spec §8 round-trip law). Every
    /// other key in `handler_result` is a "type-specific sibling" and
    /// is stored under `"<step_id>.<key>"`.
    #[instrument(skip(self, handler_result), fields(step_id))]
    pub async fn insert_retrieval_result(
        &self,
        step_id: &str,
        handler_result: &serde_json::Value,
    ) {
        let mut guard = self.inner.write().await;

        if let Some(value) = handler_result.get("value") {
            guard.insert(step_id.to_string(), value.clone());
            if let Some(array) = value.as_array() {
                for (i, element) in array.iter().enumerate() {
                    guard.insert(format!("{step_id}.{i}"), element.clone());
                }
            }
        }

        if let Some(object) = handler_result.as_object() {
            for (key, value) in object {
                if key == "value" {
                    continue;
                }
                guard.insert(format!("{step_id}.{key}"), value.clone());
            }
        }
    }

    /// Run `f` against a short-lived synchronous view of the map,
    /// holding the write lock for the duration. Lets `orc-core`'s
    /// reference resolver (which is deliberately lock-agnostic) read
    /// and cache into the real store without `orc-core` depending on
    /// this crate's lock type.
    pub async fn with_sync_view<R>(
        &self,
        f: impl FnOnce(&mut dyn orc_core::MappingStore) -> R,
    ) -> R {
        let mut guard = self.inner.write().await;
        let mut view = SyncView { map: &mut guard };
        f(&mut view)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

struct SyncView<'a> {
    map: &'a mut HashMap<String, serde_json::Value>,
}

impl orc_core::MappingStore for SyncView<'_> {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.map.get(key).cloned()
    }

    fn insert(&mut self, key: String, value: serde_json::Value) {
        self.map.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_scalar_is_readable_by_bare_key() {
        let store = ResourceMappingStore::new();
        store.insert_scalar("step-vpc", "vpc-123").await;
        assert_eq!(store.get("step-vpc").await, Some(json!("vpc-123")));
    }

    #[tokio::test]
    async fn array_retrieval_result_is_stored_both_whole_and_indexed() {
        let store = ResourceMappingStore::new();
        let result = json!({ "value": ["subnet-a", "subnet-b"] });
        store.insert_retrieval_result("step-subnets", &result).await;

        assert_eq!(
            store.get("step-subnets").await,
            Some(json!(["subnet-a", "subnet-b"]))
        );
        assert_eq!(store.get("step-subnets.0").await, Some(json!("subnet-a")));
        assert_eq!(store.get("step-subnets.1").await, Some(json!("subnet-b")));
    }

    #[tokio::test]
    async fn sibling_keys_are_stored_under_step_dot_key() {
        let store = ResourceMappingStore::new();
        let result = json!({ "value": "subnet-default", "vpc_id": "vpc-default" });
        store.insert_retrieval_result("step-subnet", &result).await;

        assert_eq!(
            store.get("step-subnet.vpc_id").await,
            Some(json!("vpc-default"))
        );
    }

    #[tokio::test]
    async fn with_sync_view_allows_orc_core_to_cache_resolved_values() {
        let store = ResourceMappingStore::new();
        store
            .with_sync_view(|view| {
                view.insert("cached-key".to_string(), json!("cached-value"));
            })
            .await;
        assert_eq!(store.get("cached-key").await, Some(json!("cached-value")));
    }
}
