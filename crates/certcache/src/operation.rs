// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

/// One of the three operations every certificate cache supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOperation {
    /// A lookup by key.
    Get,
    /// A store under a key.
    Put,
    /// A removal by key.
    Delete,
}

impl CacheOperation {
    /// Returns the name used for this operation in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "cache.get",
            Self::Put => "cache.put",
            Self::Delete => "cache.delete",
        }
    }
}

impl fmt::Display for CacheOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
