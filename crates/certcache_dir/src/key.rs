// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::path::{Component, Path};

use certcache_tier::Error;

/// Checks that `key` names a single file directly inside the cache root.
pub(crate) fn validate(key: &str) -> Result<&Path, Error> {
    if key.is_empty() {
        return Err(Error::backend("cache key must not be empty"));
    }

    if key.contains(['/', '\\', '\0']) {
        return Err(Error::backend(format!("cache key {key:?} contains a path separator")));
    }

    let path = Path::new(key);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(path),
        _ => Err(Error::backend(format!("cache key {key:?} does not name a file"))),
    }
}
