// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-process certificate cache layer backed by moka.
//!
//! [`InMemoryCertCache`] keeps certificate payloads in a concurrent moka cache.
//! Use [`InMemoryCertCacheBuilder`] to bound its size or expire entries without
//! exposing moka types in your own API.
//!
//! # Quick Start
//!
//! ```
//! use bytes::Bytes;
//! use certcache_memory::InMemoryCertCacheBuilder;
//! use certcache_tier::CertCache;
//! use std::time::Duration;
//!
//! # futures::executor::block_on(async {
//! let cache = InMemoryCertCacheBuilder::new()
//!     .max_capacity(1000)
//!     .time_to_live(Duration::from_secs(3600))
//!     .build();
//!
//! cache.put("example.com", Bytes::from_static(b"cert")).await?;
//! let value = cache.get("example.com").await?;
//! assert_eq!(value, Some(Bytes::from_static(b"cert")));
//! # Ok::<(), certcache_tier::Error>(())
//! # });
//! ```

pub mod builder;
pub mod tier;

#[doc(inline)]
pub use builder::InMemoryCertCacheBuilder;
#[doc(inline)]
pub use tier::InMemoryCertCache;
