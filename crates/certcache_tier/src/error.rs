// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for certificate cache operations.

use std::fmt;

/// Classifies what went wrong in a certificate cache operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The underlying storage failed: network, permissions, serialization.
    Backend,
    /// The cache was built from invalid settings, such as an empty layer list
    /// or an unknown write policy name.
    Configuration,
}

impl ErrorKind {
    /// Returns a stable, lowercase name for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error from a certificate cache operation.
///
/// Absent keys are never reported through this type: [`CertCache::get`] returns
/// `Ok(None)` for them. Use [`std::error::Error::source()`] to reach the
/// backend-specific cause.
///
/// [`CertCache::get`]: crate::CertCache::get
///
/// # Example
///
/// ```
/// use certcache_tier::{Error, ErrorKind};
///
/// let error = Error::backend("connection reset");
/// assert_eq!(error.kind(), ErrorKind::Backend);
/// ```
#[ohno::error]
#[display("certificate cache {kind} error")]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Creates a backend error from any underlying cause.
    pub fn backend(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::Backend, cause)
    }

    /// Creates a configuration error from any underlying cause.
    pub fn configuration(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::Configuration, cause)
    }

    /// Returns what kind of failure this is.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` if the underlying storage failed.
    #[must_use]
    pub fn is_backend(&self) -> bool {
        self.kind == ErrorKind::Backend
    }

    /// Returns `true` if the cache was configured incorrectly.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }
}

/// A specialized [`Result`] type for certificate cache operations.
pub type Result<T> = std::result::Result<T, Error>;
