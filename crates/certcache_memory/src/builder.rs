// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring in-memory certificate caches.

use std::time::Duration;

use crate::tier::InMemoryCertCache;

/// Builder for an [`InMemoryCertCache`].
///
/// # Examples
///
/// ```
/// use certcache_memory::InMemoryCertCache;
/// use std::time::Duration;
///
/// let cache = InMemoryCertCache::builder()
///     .max_capacity(1000)
///     .time_to_live(Duration::from_secs(3600))
///     .time_to_idle(Duration::from_secs(600))
///     .initial_capacity(64)
///     .name("certs")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCertCacheBuilder {
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) time_to_live: Option<Duration>,
    pub(crate) time_to_idle: Option<Duration>,
    pub(crate) name: Option<String>,
}

impl InMemoryCertCacheBuilder {
    /// Creates a builder for an unbounded cache without expiration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of entries.
    ///
    /// Without a limit the cache grows with available memory.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Sets a pre-allocation hint.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Expires entries `ttl` after they were written.
    ///
    /// Keep this well below the certificate lifetime if the memory layer sits
    /// in front of a durable layer that receives renewals from other processes.
    #[must_use]
    pub fn time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }

    /// Expires entries `tti` after they were last read or written.
    #[must_use]
    pub fn time_to_idle(mut self, tti: Duration) -> Self {
        self.time_to_idle = Some(tti);
        self
    }

    /// Names the underlying moka cache.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the cache.
    #[must_use]
    pub fn build(&self) -> InMemoryCertCache {
        InMemoryCertCache::from_builder(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unset() {
        let builder = InMemoryCertCacheBuilder::new();
        assert!(builder.max_capacity.is_none());
        assert!(builder.initial_capacity.is_none());
        assert!(builder.time_to_live.is_none());
        assert!(builder.time_to_idle.is_none());
        assert!(builder.name.is_none());
    }

    #[test]
    fn setters_record_values() {
        let builder = InMemoryCertCacheBuilder::new()
            .max_capacity(10)
            .initial_capacity(2)
            .time_to_live(Duration::from_secs(5))
            .time_to_idle(Duration::from_secs(1))
            .name("certs");

        assert_eq!(builder.max_capacity, Some(10));
        assert_eq!(builder.initial_capacity, Some(2));
        assert_eq!(builder.time_to_live, Some(Duration::from_secs(5)));
        assert_eq!(builder.time_to_idle, Some(Duration::from_secs(1)));
        assert_eq!(builder.name.as_deref(), Some("certs"));
    }
}
