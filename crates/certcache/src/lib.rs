// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Layered, pluggable storage for automatically provisioned TLS certificates.
//!
//! Certificate managers persist certificates, account keys and order state as
//! opaque byte blobs under string keys. This crate lets several storage backends
//! share that job: a [`LayeredCertCache`] reads from the fastest layer that has
//! the key and writes every layer in a configurable order.
//!
//! # Quick Start
//!
//! ```
//! use bytes::Bytes;
//! use certcache::{CertCache, FunctionalCertCache, LayeredCertCache, WritePolicy};
//! use tick::Clock;
//! # futures::executor::block_on(async {
//!
//! let cache = LayeredCertCache::builder(Clock::new_frozen())
//!     .name("certs")
//!     .named_layer("audit", FunctionalCertCache::observer(|event| {
//!         println!("{} {}", event.operation, event.key);
//!     }))
//!     .memory()
//!     .write_policy(WritePolicy::DeepFirst)
//!     .build()?;
//!
//! cache.put("example.com", Bytes::from_static(b"-----BEGIN CERTIFICATE-----")).await?;
//! assert!(cache.get("example.com").await?.is_some());
//!
//! cache.delete("example.com").await?;
//! assert!(cache.get("example.com").await?.is_none());
//! # Ok::<(), certcache::Error>(())
//! # }).unwrap();
//! ```
//!
//! # Reads
//!
//! `get` asks layer 0 first. A hit is returned at once, even an empty payload,
//! and deeper layers are not consulted. A miss or a backend error moves on to the
//! next layer. When no layer has the key, `get` returns `Ok(None)`.
//!
//! With [`ReadRepair::always`] or [`ReadRepair::when`], a value found in a deep
//! layer is also written back into the shallower layers that missed it.
//!
//! # Writes
//!
//! `put` and `delete` visit every layer. [`WritePolicy::DeepFirst`], the
//! default, starts with the deepest layer; [`WritePolicy::ShallowFirst`] starts
//! with the shallowest. The first failing layer stops the walk and its error is
//! returned unchanged; layers after it in the walk are never called.
//!
//! # Backends
//!
//! - [`InMemoryCertCache`] (feature `memory`, on by default): a concurrent
//!   in-process store.
//! - `DirCertCache` (feature `dir`): one file per key in a directory.
//! - [`FunctionalCertCache`]: closures, or an observer that only reports calls.
//! - Anything implementing [`CertCache`], including another [`LayeredCertCache`].
//!
//! # Features
//!
//! - `memory` (default): the in-memory backend.
//! - `logs` (default): `tracing` events for layer calls and `FunctionalCertCache::logger`.
//! - `metrics`: OpenTelemetry counters and histograms for layer calls.
//! - `dir`: the directory backend.
//! - `serde`: (de)serialization of [`WritePolicy`].
//! - `test-util`: `testing::MockCertCache`, a recording mock backend for tests.

mod builder;
mod functional;
mod layered;
mod operation;
mod policy;
mod telemetry;

#[doc(inline)]
pub use builder::LayeredCertCacheBuilder;
#[doc(inline)]
pub use certcache_tier::{CertCache, DynamicCertCache, DynamicCertCacheExt, Error, ErrorKind, Result};
#[cfg(feature = "dir")]
#[doc(inline)]
pub use certcache_dir::DirCertCache;
#[cfg(feature = "memory")]
#[doc(inline)]
pub use certcache_memory::{InMemoryCertCache, InMemoryCertCacheBuilder};
#[doc(inline)]
pub use functional::{CacheEvent, FunctionalCertCache};
#[doc(inline)]
pub use layered::LayeredCertCache;
#[doc(inline)]
pub use operation::CacheOperation;
#[doc(inline)]
pub use policy::{ReadRepair, WritePolicy};
#[doc(inline)]
pub use telemetry::TelemetryConfig;

/// Test doubles for certificate cache backends.
#[cfg(feature = "test-util")]
pub mod testing {
    #[doc(inline)]
    pub use certcache_tier::testing::{CacheOp, MockCertCache};
}
