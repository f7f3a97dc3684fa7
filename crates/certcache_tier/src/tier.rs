// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for certificate storage backends.

use bytes::Bytes;

use crate::Error;

/// Trait for certificate storage backends.
///
/// Payloads are opaque; keys are externally meaningful identifiers (a domain
/// name, an account key thumbprint) that backends never interpret.
///
/// Cancellation is driven by the caller: dropping a returned future abandons the
/// in-flight call. Backends are free to apply their own I/O timeouts.
#[dynosaur::dynosaur(pub(crate) DynCertCache = dyn(box) CertCache, bridge(none))]
pub trait CertCache: Send + Sync {
    /// Returns the payload stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent. Errors are reserved for failures
    /// of the backend itself (connectivity, permissions, corrupted storage).
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Bytes>, Error>> + Send;

    /// Stores `data` under `key`, replacing any previous payload.
    ///
    /// Backends may encode the payload however they like, as long as a later
    /// [`get`](Self::get) returns exactly the same bytes.
    fn put(&self, key: &str, data: Bytes) -> impl Future<Output = Result<(), Error>> + Send;

    /// Removes the payload stored under `key`.
    ///
    /// Removing a key that was never stored succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), Error>> + Send;
}
