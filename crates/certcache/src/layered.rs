// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Layered certificate cache.
//!
//! A [`LayeredCertCache`] chains several backends. Reads go from the shallowest
//! layer to the deepest and stop at the first hit; writes and deletes visit every
//! layer in the order set by its [`WritePolicy`] and stop at the first failure.

use std::{borrow::Cow, fmt, sync::Arc};

use bytes::Bytes;
use certcache_tier::{CertCache, DynamicCertCache, Error};
use tick::Clock;

use crate::{
    CacheOperation, LayeredCertCacheBuilder, ReadRepair, WritePolicy,
    telemetry::{CacheActivity, CacheTelemetry, LayerScope, ext::ClockExt},
};

/// One backend in a layered chain, with the name it reports in telemetry.
pub(crate) struct Layer {
    pub(crate) name: Cow<'static, str>,
    pub(crate) cache: DynamicCertCache,
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Layer").field(&self.name).finish()
    }
}

pub(crate) struct LayeredCertCacheInner {
    pub(crate) name: Cow<'static, str>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) write_policy: WritePolicy,
    pub(crate) read_repair: ReadRepair,
    pub(crate) clock: Clock,
    pub(crate) telemetry: CacheTelemetry,
}

impl fmt::Debug for LayeredCertCacheInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredCertCache")
            .field("name", &self.name)
            .field("layers", &self.layers.iter().map(|layer| &*layer.name).collect::<Vec<_>>())
            .field("write_policy", &self.write_policy)
            .field("read_repair", &self.read_repair)
            .finish_non_exhaustive()
    }
}

/// A certificate cache that falls back from shallow, fast layers to deep, durable ones.
///
/// Index 0 of the chain is the shallowest layer. On `get`, layers are queried in
/// order and the first hit wins; a miss or a backend error moves on to the next
/// layer, and a key no layer holds is reported as `Ok(None)`. On `put` and
/// `delete`, every layer is visited in [`WritePolicy`] order and the first
/// failure is returned as is, leaving the remaining layers untouched.
///
/// The chain is immutable after construction. Clones share it.
///
/// A `LayeredCertCache` is itself a [`CertCache`], so one can serve as a layer
/// of another.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use certcache::{CertCache, InMemoryCertCache, LayeredCertCache, WritePolicy};
/// use tick::Clock;
/// # futures::executor::block_on(async {
///
/// let cache = LayeredCertCache::builder(Clock::new_frozen())
///     .named_layer("hot", InMemoryCertCache::new())
///     .named_layer("warm", InMemoryCertCache::new())
///     .write_policy(WritePolicy::DeepFirst)
///     .build()?;
///
/// cache.put("example.com", Bytes::from_static(b"cert")).await?;
/// assert_eq!(cache.get("example.com").await?, Some(Bytes::from_static(b"cert")));
/// # Ok::<(), certcache::Error>(())
/// # }).unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct LayeredCertCache {
    inner: Arc<LayeredCertCacheInner>,
}

impl LayeredCertCache {
    /// Starts building a layered cache that times layer calls with `clock`.
    #[must_use]
    pub fn builder(clock: Clock) -> LayeredCertCacheBuilder {
        LayeredCertCacheBuilder::new(clock)
    }

    /// Builds a deep-first layered cache from `layers`, shallowest first.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `layers` is empty.
    pub fn new(clock: Clock, layers: impl IntoIterator<Item = DynamicCertCache>) -> Result<Self, Error> {
        Self::with_policy(clock, WritePolicy::default(), layers)
    }

    /// Builds a layered cache from `layers`, shallowest first, with the given write policy.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `layers` is empty.
    pub fn with_policy(
        clock: Clock,
        write_policy: WritePolicy,
        layers: impl IntoIterator<Item = DynamicCertCache>,
    ) -> Result<Self, Error> {
        layers
            .into_iter()
            .fold(Self::builder(clock).write_policy(write_policy), LayeredCertCacheBuilder::layer)
            .build()
    }

    pub(crate) fn from_inner(inner: LayeredCertCacheInner) -> Self {
        Self { inner: Arc::new(inner) }
    }

    /// Returns the name this cache reports in telemetry.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the number of layers in the chain. Always at least one.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.inner.layers.len()
    }

    /// Returns the order in which writes and deletes visit the layers.
    #[must_use]
    pub fn write_policy(&self) -> WritePolicy {
        self.inner.write_policy
    }

    /// Returns the layer names, shallowest first.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.inner.layers.iter().map(|layer| &*layer.name)
    }
}

impl LayeredCertCacheInner {
    fn scope<'a>(&'a self, layer: &'a Layer) -> LayerScope<'a> {
        LayerScope {
            cache: &self.name,
            layer: &layer.name,
        }
    }

    /// Copies a value found at `found_at` into every shallower layer.
    ///
    /// Failures are recorded and otherwise ignored.
    async fn repair(&self, key: &str, data: &Bytes, found_at: usize) {
        for layer in self.layers.iter().take(found_at) {
            let timed = self.clock.timed_async(layer.cache.put(key, data.clone())).await;
            let scope = self.scope(layer);
            match timed.result {
                Ok(()) => self
                    .telemetry
                    .record(scope, CacheOperation::Put, CacheActivity::Repaired, timed.duration),
                Err(e) => self.telemetry.record_error(scope, CacheOperation::Put, timed.duration, &e),
            }
        }
    }
}

impl CertCache for LayeredCertCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        let inner = &*self.inner;

        for (index, layer) in inner.layers.iter().enumerate() {
            let timed = inner.clock.timed_async(layer.cache.get(key)).await;
            let scope = inner.scope(layer);

            match timed.result {
                Ok(Some(data)) => {
                    inner.telemetry.record(scope, CacheOperation::Get, CacheActivity::Hit, timed.duration);
                    if index > 0 && inner.read_repair.should_repair(key, &data) {
                        inner.repair(key, &data, index).await;
                    }
                    return Ok(Some(data));
                }
                Ok(None) => inner
                    .telemetry
                    .record(scope, CacheOperation::Get, CacheActivity::Miss, timed.duration),
                // A failing layer is skipped like a miss.
                Err(e) => inner.telemetry.record_error(scope, CacheOperation::Get, timed.duration, &e),
            }
        }

        Ok(None)
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<(), Error> {
        let inner = &*self.inner;

        for layer in inner.write_policy.write_order(&inner.layers) {
            let timed = inner.clock.timed_async(layer.cache.put(key, data.clone())).await;
            let scope = inner.scope(layer);

            if let Err(e) = timed.result {
                inner.telemetry.record_error(scope, CacheOperation::Put, timed.duration, &e);
                return Err(e);
            }
            inner
                .telemetry
                .record(scope, CacheOperation::Put, CacheActivity::Stored, timed.duration);
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let inner = &*self.inner;

        for layer in inner.write_policy.write_order(&inner.layers) {
            let timed = inner.clock.timed_async(layer.cache.delete(key)).await;
            let scope = inner.scope(layer);

            if let Err(e) = timed.result {
                inner.telemetry.record_error(scope, CacheOperation::Delete, timed.duration, &e);
                return Err(e);
            }
            inner
                .telemetry
                .record(scope, CacheOperation::Delete, CacheActivity::Deleted, timed.duration);
        }

        Ok(())
    }
}
