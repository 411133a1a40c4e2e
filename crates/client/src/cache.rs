//! Coarse, tag-based query cache.
//!
//! Query results are stored under their request key and labelled with a tag.
//! Mutations invalidate whole tags, never single entries: any parcel mutation
//! drops every cached parcel query, any user mutation drops every user query.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Parcels,
    Users,
}

#[derive(Debug, Clone)]
struct CachedQuery {
    tag: CacheTag,
    value: Value,
}

/// Shared handle; clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<String, CachedQuery>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, if present and still decodable as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        let cached = entries.get(key)?;
        serde_json::from_value(cached.value.clone()).ok()
    }

    pub async fn put<T: Serialize>(&self, key: impl Into<String>, tag: CacheTag, value: &T) {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => {
                self.entries.write().await.insert(key, CachedQuery { tag, value });
            }
            Err(err) => tracing::warn!(%key, error = %err, "query result not cacheable"),
        }
    }

    /// Drop every entry carrying `tag`. Returns how many were removed.
    pub async fn invalidate(&self, tag: CacheTag) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, cached| cached.tag != tag);
        let removed = before - entries.len();
        tracing::debug!(?tag, removed, "cache invalidated");
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalidation_is_per_tag() {
        let cache = QueryCache::new();
        cache.put("/parcels/me", CacheTag::Parcels, &vec![1, 2]).await;
        cache.put("/parcels?page=1&limit=10", CacheTag::Parcels, &vec![3]).await;
        cache.put("/user/all-users?page=1&limit=10", CacheTag::Users, &vec![4]).await;

        assert_eq!(cache.invalidate(CacheTag::Parcels).await, 2);
        assert!(!cache.contains("/parcels/me").await);
        assert_eq!(cache.get::<Vec<i32>>("/user/all-users?page=1&limit=10").await, Some(vec![4]));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = QueryCache::new();
        let other = cache.clone();
        other.put("/parcels/me", CacheTag::Parcels, &"x").await;
        assert_eq!(cache.get::<String>("/parcels/me").await.as_deref(), Some("x"));
        assert_eq!(cache.get::<u32>("/parcels/me").await, None);
    }
}
