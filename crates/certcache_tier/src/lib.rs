// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Storage contract for certificate cache backends.
//!
//! This crate defines the [`CertCache`] trait that every certificate storage backend
//! satisfies, the [`Error`] type shared by all of them, and [`DynamicCertCache`], a
//! type-erased handle that lets heterogeneous backends sit side by side in one
//! layered cache.
//!
//! # Overview
//!
//! Certificate managers persist opaque byte blobs (certificates, account keys,
//! order state) under string keys such as a domain name. A backend only has to
//! answer three questions: what is stored under a key, store this under a key, and
//! forget a key. Absence is not an error: `get` reports it as `Ok(None)`.
//!
//! # Implementing a Backend
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//!
//! use bytes::Bytes;
//! use certcache_tier::{CertCache, Error};
//!
//! struct SimpleCache(RwLock<HashMap<String, Bytes>>);
//!
//! impl CertCache for SimpleCache {
//!     async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
//!         Ok(self.0.read().unwrap().get(key).cloned())
//!     }
//!
//!     async fn put(&self, key: &str, data: Bytes) -> Result<(), Error> {
//!         self.0.write().unwrap().insert(key.to_owned(), data);
//!         Ok(())
//!     }
//!
//!     async fn delete(&self, key: &str) -> Result<(), Error> {
//!         self.0.write().unwrap().remove(key);
//!         Ok(())
//!     }
//! }
//! ```

mod dynamic;
pub mod error;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
pub(crate) mod tier;

#[doc(inline)]
pub use dynamic::{DynamicCertCache, DynamicCertCacheExt};
#[doc(inline)]
pub use error::{Error, ErrorKind, Result};
#[doc(inline)]
pub use tier::CertCache;
