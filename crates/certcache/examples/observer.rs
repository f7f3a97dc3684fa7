// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Observes every call a layered cache makes, without storing anything.
//!
//! The durable layer here is a closure-backed cache that always fails to
//! write, showing how a deep-first write stops before shallower layers.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use certcache::{CacheOperation, CertCache, Error, FunctionalCertCache, LayeredCertCache};
use futures::future;
use tick::Clock;

fn main() -> Result<(), Error> {
    futures::executor::block_on(run())
}

async fn run() -> Result<(), Error> {
    let calls: Arc<Mutex<Vec<(CacheOperation, String)>>> = Arc::default();
    let sink = Arc::clone(&calls);

    let observer = FunctionalCertCache::observer(move |event| {
        sink.lock().unwrap().push((event.operation, event.key.to_owned()));
    });

    let unavailable = FunctionalCertCache::new(
        |_key: String| future::ready(Ok(None)),
        |key: String, _data: Bytes| future::ready(Err(Error::backend(format!("database unavailable for {key}")))),
        |_key: String| future::ready(Ok(())),
    );

    let cache = LayeredCertCache::builder(Clock::new_frozen())
        .named_layer("observer", observer)
        .named_layer("database", unavailable)
        .build()?;

    println!("get: {:?}", cache.get("example.com").await?);

    match cache.put("example.com", Bytes::from_static(b"cert")).await {
        Ok(()) => println!("put succeeded"),
        Err(e) => println!("put failed: {e}"),
    }

    cache.delete("example.com").await?;

    for (operation, key) in calls.lock().unwrap().iter() {
        println!("observed {operation} {key}");
    }

    Ok(())
}
