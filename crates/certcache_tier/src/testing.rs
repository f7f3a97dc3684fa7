// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock certificate cache for testing.
//!
//! [`MockCertCache`] stores payloads in memory, records every call it receives
//! and can be told to fail selected calls, which makes it suitable for checking
//! traversal order and error propagation in layered caches.

use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::{CertCache, Error};

/// A recorded cache call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp {
    /// `get` was called with the given key.
    Get(String),
    /// `put` was called with the given key and payload.
    Put {
        /// The key that was written.
        key: String,
        /// The payload that was written.
        data: Bytes,
    },
    /// `delete` was called with the given key.
    Delete(String),
}

impl CacheOp {
    /// Returns the key this call targeted.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Get(key) | Self::Delete(key) | Self::Put { key, .. } => key,
        }
    }

    /// Returns `true` for `put` and `delete` calls.
    #[must_use]
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Get(_))
    }
}

type FailPredicate = Box<dyn Fn(&CacheOp) -> bool + Send + Sync>;

/// A configurable in-memory certificate cache for tests.
///
/// Clones share storage, the operation log and the failure predicate, so a test
/// can keep a clone around to inspect a backend after handing it to a layered
/// cache.
///
/// # Examples
///
/// ```no_run
/// use bytes::Bytes;
/// use certcache_tier::{CertCache, testing::{CacheOp, MockCertCache}};
///
/// # async fn example() {
/// let cache = MockCertCache::new();
/// cache.put("example.com", Bytes::from_static(b"cert")).await.unwrap();
/// assert_eq!(cache.get("example.com").await.unwrap(), Some(Bytes::from_static(b"cert")));
///
/// // Fail every write from now on.
/// cache.fail_when(CacheOp::is_write);
/// assert!(cache.delete("example.com").await.is_err());
/// # }
/// ```
pub struct MockCertCache {
    data: Arc<Mutex<HashMap<String, Bytes>>>,
    operations: Arc<Mutex<Vec<CacheOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for MockCertCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCertCache")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl Clone for MockCertCache {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
        }
    }
}

impl Default for MockCertCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCertCache {
    /// Creates an empty mock cache.
    #[must_use]
    pub fn new() -> Self {
        Self::with_data(HashMap::new())
    }

    /// Creates a mock cache pre-populated with `data`.
    #[must_use]
    pub fn with_data(data: HashMap<String, Bytes>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a mock cache holding a single entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::with_data(HashMap::from([(key.into(), data.into())]))
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns `true` if a payload is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Returns the stored payload without recording an operation.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Bytes> {
        self.data.lock().get(key).cloned()
    }

    /// Sets a predicate deciding which calls fail with a backend error.
    ///
    /// Failed calls are still recorded but leave the stored data untouched.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&CacheOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Removes the failure predicate.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns every call recorded so far, oldest first.
    #[must_use]
    pub fn operations(&self) -> Vec<CacheOp> {
        self.operations.lock().clone()
    }

    /// Returns only the recorded `put` and `delete` calls.
    #[must_use]
    pub fn writes(&self) -> Vec<CacheOp> {
        self.operations.lock().iter().filter(|op| op.is_write()).cloned().collect()
    }

    /// Forgets all recorded calls.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    /// Records `op` and reports whether it has to fail.
    fn record(&self, op: CacheOp) -> bool {
        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        self.operations.lock().push(op);
        fail
    }
}

impl CertCache for MockCertCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        if self.record(CacheOp::Get(key.to_owned())) {
            return Err(Error::backend("mock: get failed"));
        }
        Ok(self.data.lock().get(key).cloned())
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<(), Error> {
        let op = CacheOp::Put {
            key: key.to_owned(),
            data: data.clone(),
        };
        if self.record(op) {
            return Err(Error::backend("mock: put failed"));
        }
        self.data.lock().insert(key.to_owned(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        if self.record(CacheOp::Delete(key.to_owned())) {
            return Err(Error::backend("mock: delete failed"));
        }
        self.data.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        futures::executor::block_on(f)
    }

    #[test]
    fn failed_put_is_recorded_but_not_stored() {
        block_on(async {
            let cache = MockCertCache::new();
            cache.fail_when(CacheOp::is_write);

            let err = cache.put("k", Bytes::from_static(b"v")).await.expect_err("put should fail");
            assert!(err.is_backend());
            assert!(!cache.contains_key("k"));
            assert_eq!(cache.writes().len(), 1);
        });
    }

    #[test]
    fn predicate_can_target_single_key() {
        block_on(async {
            let cache = MockCertCache::with_entry("allowed", Bytes::from_static(b"v"));
            cache.fail_when(|op| matches!(op, CacheOp::Get(k) if k == "forbidden"));

            assert!(cache.get("forbidden").await.is_err());
            assert_eq!(cache.get("allowed").await.expect("get failed"), Some(Bytes::from_static(b"v")));

            cache.clear_failures();
            assert!(cache.get("forbidden").await.expect("get failed").is_none());
        });
    }

    #[test]
    fn peek_does_not_record() {
        let cache = MockCertCache::with_entry("k", Bytes::from_static(b"v"));
        assert_eq!(cache.peek("k"), Some(Bytes::from_static(b"v")));
        assert!(cache.operations().is_empty());
        assert_eq!(cache.entry_count(), 1);
    }

    #[test]
    fn op_accessors() {
        let put = CacheOp::Put {
            key: "k".to_string(),
            data: Bytes::new(),
        };
        assert_eq!(put.key(), "k");
        assert!(put.is_write());
        assert!(CacheOp::Delete("k".to_string()).is_write());
        assert!(!CacheOp::Get("k".to_string()).is_write());
    }
}
