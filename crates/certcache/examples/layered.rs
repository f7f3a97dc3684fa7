// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builds the usual three-layer certificate cache and logs every layer call.
//!
//! The chain is: an audit logger, an in-memory layer, and a "durable" store
//! standing in for a managed database. Run with
//! `cargo run -p certcache --example layered`.

use bytes::Bytes;
use certcache::{
    CertCache, Error, FunctionalCertCache, InMemoryCertCache, LayeredCertCache, ReadRepair, TelemetryConfig, WritePolicy,
};
use tick::Clock;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let durable = InMemoryCertCache::builder().name("durable").build();

    let cache = LayeredCertCache::builder(Clock::new_tokio())
        .name("certs")
        .named_layer("audit", FunctionalCertCache::logger())
        .named_layer("memory", InMemoryCertCache::with_capacity(1_000))
        .named_layer("durable", durable.clone())
        .write_policy("DEEP_FIRST".parse::<WritePolicy>()?)
        .read_repair(ReadRepair::always())
        .telemetry(TelemetryConfig::new().with_logs())
        .build()?;

    cache.put("example.com", Bytes::from_static(b"-----BEGIN CERTIFICATE-----")).await?;
    let cert = cache.get("example.com").await?;
    println!("cached certificate: {} bytes", cert.map_or(0, |c| c.len()));

    // Only the durable layer knows this key; read repair copies it into memory.
    durable.put("example.org", Bytes::from_static(b"account key")).await?;
    let _ = cache.get("example.org").await?;
    let _ = cache.get("example.org").await?;

    cache.delete("example.com").await?;
    println!("after delete: {:?}", cache.get("example.com").await?);

    Ok(())
}
