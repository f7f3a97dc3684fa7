// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for layered certificate caches.

use std::borrow::Cow;

use certcache_tier::{CertCache, DynamicCertCacheExt, Error};
use tick::Clock;

#[cfg(feature = "dir")]
use certcache_dir::DirCertCache;
#[cfg(feature = "memory")]
use certcache_memory::InMemoryCertCache;

use crate::{
    LayeredCertCache, ReadRepair, TelemetryConfig, WritePolicy,
    layered::{Layer, LayeredCertCacheInner},
};

const DEFAULT_NAME: &str = "certcache";

/// Builder for [`LayeredCertCache`].
///
/// Created by [`LayeredCertCache::builder`]. Layers are added shallowest first.
///
/// # Examples
///
/// ```
/// use certcache::{FunctionalCertCache, LayeredCertCache, ReadRepair, WritePolicy};
/// use tick::Clock;
///
/// let cache = LayeredCertCache::builder(Clock::new_frozen())
///     .name("certs")
///     .named_layer("audit", FunctionalCertCache::observer(|_| {}))
///     .memory()
///     .write_policy(WritePolicy::ShallowFirst)
///     .read_repair(ReadRepair::always())
///     .build()
///     .unwrap();
///
/// assert_eq!(cache.layer_names().collect::<Vec<_>>(), vec!["audit", "memory"]);
/// ```
#[derive(Debug)]
pub struct LayeredCertCacheBuilder {
    name: Cow<'static, str>,
    layers: Vec<Layer>,
    write_policy: WritePolicy,
    read_repair: ReadRepair,
    clock: Clock,
    telemetry: TelemetryConfig,
}

impl LayeredCertCacheBuilder {
    pub(crate) fn new(clock: Clock) -> Self {
        Self {
            name: Cow::Borrowed(DEFAULT_NAME),
            layers: Vec::new(),
            write_policy: WritePolicy::default(),
            read_repair: ReadRepair::default(),
            clock,
            telemetry: TelemetryConfig::default(),
        }
    }

    /// Sets the name reported in telemetry. Defaults to `certcache`.
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Appends a layer deeper than every layer added so far.
    ///
    /// The layer is named `layer{index}` in telemetry, where `index` is its
    /// position in the chain.
    #[must_use]
    pub fn layer<C>(self, cache: C) -> Self
    where
        C: CertCache + 'static,
    {
        let name = format!("layer{}", self.layers.len());
        self.named_layer(name, cache)
    }

    /// Appends a named layer deeper than every layer added so far.
    #[must_use]
    pub fn named_layer<C>(mut self, name: impl Into<Cow<'static, str>>, cache: C) -> Self
    where
        C: CertCache + 'static,
    {
        self.layers.push(Layer {
            name: name.into(),
            cache: cache.into_dynamic(),
        });
        self
    }

    /// Appends an unbounded in-memory layer named `memory`.
    #[cfg(feature = "memory")]
    #[must_use]
    pub fn memory(self) -> Self {
        self.named_layer("memory", InMemoryCertCache::new())
    }

    /// Appends a directory layer named `directory` rooted at `root`.
    #[cfg(feature = "dir")]
    #[must_use]
    pub fn directory(self, root: impl Into<std::path::PathBuf>) -> Self {
        self.named_layer("directory", DirCertCache::new(root))
    }

    /// Sets the order in which writes and deletes visit the layers.
    ///
    /// Defaults to [`WritePolicy::DeepFirst`].
    #[must_use]
    pub fn write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    /// Sets whether values found in deep layers are copied into shallower ones.
    ///
    /// Defaults to [`ReadRepair::never`].
    #[must_use]
    pub fn read_repair(mut self, read_repair: ReadRepair) -> Self {
        self.read_repair = read_repair;
        self
    }

    /// Enables logs and/or metrics for every layer call.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfig) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Builds the layered cache.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no layer was added.
    pub fn build(self) -> Result<LayeredCertCache, Error> {
        if self.layers.is_empty() {
            return Err(Error::configuration(format!(
                "layered certificate cache {:?} has no layers",
                self.name
            )));
        }

        Ok(LayeredCertCache::from_inner(LayeredCertCacheInner {
            name: self.name,
            layers: self.layers,
            write_policy: self.write_policy,
            read_repair: self.read_repair,
            clock: self.clock,
            telemetry: self.telemetry.build(),
        }))
    }
}
