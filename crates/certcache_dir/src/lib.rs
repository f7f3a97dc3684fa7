// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Filesystem directory certificate cache layer.
//!
//! [`DirCertCache`] persists each key as a file inside a root directory. It is
//! the usual middle layer of a certificate cache: it survives process restarts
//! without a network round trip, and it is cheap enough to sit in front of a
//! remote database.
//!
//! ```no_run
//! use bytes::Bytes;
//! use certcache_dir::DirCertCache;
//! use certcache_tier::CertCache;
//!
//! # async fn example() -> Result<(), certcache_tier::Error> {
//! let cache = DirCertCache::new("/var/lib/certs");
//! cache.put("example.com", Bytes::from_static(b"cert")).await?;
//! assert!(cache.get("example.com").await?.is_some());
//! # Ok(())
//! # }
//! ```

mod dir;
mod key;

#[doc(inline)]
pub use dir::DirCertCache;
