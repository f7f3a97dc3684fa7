// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Certificate cache backed by caller-supplied closures.

use std::{fmt, sync::Arc};

use bytes::Bytes;
use certcache_tier::{CertCache, Error};
use futures::{
    FutureExt,
    future::{self, BoxFuture},
};

use crate::CacheOperation;

type GetFn = Box<dyn Fn(String) -> BoxFuture<'static, Result<Option<Bytes>, Error>> + Send + Sync>;
type PutFn = Box<dyn Fn(String, Bytes) -> BoxFuture<'static, Result<(), Error>> + Send + Sync>;
type DeleteFn = Box<dyn Fn(String) -> BoxFuture<'static, Result<(), Error>> + Send + Sync>;

/// A call observed by [`FunctionalCertCache::observer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEvent<'a> {
    /// The operation that was called.
    pub operation: CacheOperation,
    /// The key it was called with.
    pub key: &'a str,
}

/// A certificate cache whose operations are plain async closures.
///
/// Each call is passed straight through to the matching closure. This is the
/// quickest way to plug an existing storage client into a layered cache without
/// writing a [`CertCache`] implementation.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use certcache::{CertCache, FunctionalCertCache};
/// use futures::future;
/// # futures::executor::block_on(async {
///
/// let cache = FunctionalCertCache::new(
///     |key: String| async move { Ok(Some(Bytes::from(key))) },
///     |_key: String, _data: Bytes| future::ready(Ok(())),
///     |_key: String| future::ready(Ok(())),
/// );
///
/// assert_eq!(cache.get("echo").await.unwrap(), Some(Bytes::from_static(b"echo")));
/// # });
/// ```
pub struct FunctionalCertCache {
    get: GetFn,
    put: PutFn,
    delete: DeleteFn,
}

impl fmt::Debug for FunctionalCertCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionalCertCache").finish_non_exhaustive()
    }
}

impl FunctionalCertCache {
    /// Creates a cache from one closure per operation.
    pub fn new<G, GF, P, PF, D, DF>(get: G, put: P, delete: D) -> Self
    where
        G: Fn(String) -> GF + Send + Sync + 'static,
        GF: Future<Output = Result<Option<Bytes>, Error>> + Send + 'static,
        P: Fn(String, Bytes) -> PF + Send + Sync + 'static,
        PF: Future<Output = Result<(), Error>> + Send + 'static,
        D: Fn(String) -> DF + Send + Sync + 'static,
        DF: Future<Output = Result<(), Error>> + Send + 'static,
    {
        Self {
            get: Box::new(move |key| get(key).boxed()),
            put: Box::new(move |key, data| put(key, data).boxed()),
            delete: Box::new(move |key| delete(key).boxed()),
        }
    }

    /// Creates a cache that stores nothing and reports every call to `callback`.
    ///
    /// `get` always misses, `put` and `delete` always succeed. Placed in front of
    /// other layers, it makes every call through a layered cache observable.
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    ///
    /// use certcache::{CacheOperation, CertCache, FunctionalCertCache};
    /// # futures::executor::block_on(async {
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&seen);
    /// let cache = FunctionalCertCache::observer(move |event| {
    ///     sink.lock().unwrap().push((event.operation, event.key.to_owned()));
    /// });
    ///
    /// assert!(cache.get("example.com").await.unwrap().is_none());
    /// assert_eq!(
    ///     seen.lock().unwrap().as_slice(),
    ///     &[(CacheOperation::Get, "example.com".to_owned())]
    /// );
    /// # });
    /// ```
    pub fn observer<F>(callback: F) -> Self
    where
        F: Fn(&CacheEvent<'_>) + Send + Sync + 'static,
    {
        let on_get = Arc::new(callback);
        let on_put = Arc::clone(&on_get);
        let on_delete = Arc::clone(&on_get);

        Self::new(
            move |key: String| {
                on_get(&CacheEvent {
                    operation: CacheOperation::Get,
                    key: &key,
                });
                future::ready(Ok(None))
            },
            move |key: String, _data: Bytes| {
                on_put(&CacheEvent {
                    operation: CacheOperation::Put,
                    key: &key,
                });
                future::ready(Ok(()))
            },
            move |key: String| {
                on_delete(&CacheEvent {
                    operation: CacheOperation::Delete,
                    key: &key,
                });
                future::ready(Ok(()))
            },
        )
    }

    /// Creates an observer that emits an `INFO` `tracing` event for every call.
    #[cfg(feature = "logs")]
    #[must_use]
    pub fn logger() -> Self {
        Self::observer(|event| {
            tracing::info!(cache.operation = event.operation.as_str(), cache.key = event.key, "cache.call");
        })
    }
}

impl CertCache for FunctionalCertCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        (self.get)(key.to_owned()).await
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<(), Error> {
        (self.put)(key.to_owned(), data).await
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        (self.delete)(key.to_owned()).await
    }
}
