// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Type-erased certificate cache handle.

use std::{fmt::Debug, sync::Arc};

use bytes::Bytes;

use crate::{CertCache, Error, tier::DynCertCache};

/// Extension trait for converting any [`CertCache`] into a [`DynamicCertCache`].
///
/// # Examples
///
/// ```
/// use certcache_tier::{CertCache, DynamicCertCache, DynamicCertCacheExt};
///
/// fn erase<T>(backend: T) -> DynamicCertCache
/// where
///     T: CertCache + 'static,
/// {
///     backend.into_dynamic()
/// }
/// ```
pub trait DynamicCertCacheExt: Sized {
    /// Converts this backend into a [`DynamicCertCache`].
    fn into_dynamic(self) -> DynamicCertCache;
}

impl<T> DynamicCertCacheExt for T
where
    T: CertCache + 'static,
{
    fn into_dynamic(self) -> DynamicCertCache {
        DynamicCertCache::new(self)
    }
}

/// A clonable, type-erased certificate cache.
///
/// Layered caches hold their layers as `DynamicCertCache` so that an in-memory
/// store, a directory and a remote database can share one chain.
pub struct DynamicCertCache(Arc<DynCertCache<'static>>);

impl DynamicCertCache {
    pub(crate) fn new<T>(backend: T) -> Self
    where
        T: CertCache + 'static,
    {
        Self(DynCertCache::new_arc(backend))
    }
}

impl Debug for DynamicCertCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicCertCache").finish()
    }
}

impl Clone for DynamicCertCache {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl CertCache for DynamicCertCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        self.0.get(key).await
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<(), Error> {
        self.0.put(key, data).await
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.0.delete(key).await
    }
}
