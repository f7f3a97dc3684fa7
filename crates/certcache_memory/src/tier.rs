// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory certificate cache layer using moka.

use bytes::Bytes;
use certcache_tier::{CertCache, Error};
use moka::future::Cache;

use crate::builder::InMemoryCertCacheBuilder;

/// An in-memory certificate cache layer backed by moka.
///
/// Clones share the same underlying storage. Operations never fail.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use certcache_memory::InMemoryCertCache;
/// use certcache_tier::CertCache;
/// # futures::executor::block_on(async {
///
/// let cache = InMemoryCertCache::new();
/// cache.put("example.com", Bytes::from_static(b"cert")).await.unwrap();
/// assert!(cache.get("example.com").await.unwrap().is_some());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryCertCache {
    inner: Cache<String, Bytes>,
}

impl Default for InMemoryCertCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCertCache {
    /// Creates an unbounded in-memory cache without expiration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates an in-memory cache holding at most `max_capacity` entries.
    ///
    /// Once full, entries are evicted using moka's `TinyLFU` policy.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::builder().max_capacity(max_capacity).build()
    }

    /// Creates a builder for configuring an in-memory cache.
    #[must_use]
    pub fn builder() -> InMemoryCertCacheBuilder {
        InMemoryCertCacheBuilder::new()
    }

    pub(crate) fn from_builder(builder: &InMemoryCertCacheBuilder) -> Self {
        let mut moka_builder = Cache::builder();

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(ttl) = builder.time_to_live {
            moka_builder = moka_builder.time_to_live(ttl);
        }

        if let Some(tti) = builder.time_to_idle {
            moka_builder = moka_builder.time_to_idle(tti);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: moka_builder.build(),
        }
    }

    /// Returns the approximate number of stored entries.
    ///
    /// Moka updates this count lazily, so it may briefly lag behind writes.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl CertCache for InMemoryCertCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        Ok(self.inner.get(key).await)
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<(), Error> {
        self.inner.insert(key.to_owned(), data).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.inner.invalidate(key).await;
        Ok(())
    }
}
