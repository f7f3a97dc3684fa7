// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for layered cache reads, writes and deletes.

use bytes::Bytes;
use certcache::{CertCache, DynamicCertCacheExt, Error, ErrorKind, LayeredCertCache, ReadRepair, WritePolicy};
use certcache_tier::testing::{CacheOp, MockCertCache};
use tick::Clock;

type TestResult = Result<(), Error>;

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

fn layered(policy: WritePolicy, layers: &[&MockCertCache]) -> LayeredCertCache {
    layers
        .iter()
        .fold(LayeredCertCache::builder(Clock::new_frozen()).write_policy(policy), |builder, layer| {
            builder.layer((*layer).clone())
        })
        .build()
        .expect("non-empty chain")
}

fn get(key: &str) -> CacheOp {
    CacheOp::Get(key.to_owned())
}

fn put(key: &str, data: &'static [u8]) -> CacheOp {
    CacheOp::Put {
        key: key.to_owned(),
        data: Bytes::from_static(data),
    }
}

fn delete(key: &str) -> CacheOp {
    CacheOp::Delete(key.to_owned())
}

#[test]
fn single_layer_round_trip() -> TestResult {
    block_on(async {
        let layer = MockCertCache::new();
        let cache = layered(WritePolicy::DeepFirst, &[&layer]);

        let payload = Bytes::from(vec![0x30, 0x82, 0x01, 0x0a, 0x00, 0xff]);
        cache.put("example.com", payload.clone()).await?;

        assert_eq!(cache.get("example.com").await?, Some(payload));
        Ok(())
    })
}

#[test]
fn miss_in_every_layer_is_none() -> TestResult {
    block_on(async {
        let (a, b) = (MockCertCache::new(), MockCertCache::new());
        let cache = layered(WritePolicy::DeepFirst, &[&a, &b]);

        assert_eq!(cache.get("missing").await?, None);
        assert_eq!(a.operations(), vec![get("missing")]);
        assert_eq!(b.operations(), vec![get("missing")]);
        Ok(())
    })
}

#[test]
fn get_falls_back_in_order_without_writing() -> TestResult {
    block_on(async {
        let a = MockCertCache::new();
        let b = MockCertCache::new();
        let c = MockCertCache::with_entry("k", "deep");
        let cache = layered(WritePolicy::DeepFirst, &[&a, &b, &c]);

        assert_eq!(cache.get("k").await?, Some(Bytes::from_static(b"deep")));

        assert_eq!(a.operations(), vec![get("k")]);
        assert_eq!(b.operations(), vec![get("k")]);
        assert_eq!(c.operations(), vec![get("k")]);
        assert!(a.writes().is_empty());
        assert!(b.writes().is_empty());
        Ok(())
    })
}

#[test]
fn shallow_layer_is_authoritative() -> TestResult {
    block_on(async {
        let a = MockCertCache::with_entry("k", "shallow");
        let b = MockCertCache::with_entry("k", "deep");
        let cache = layered(WritePolicy::DeepFirst, &[&a, &b]);

        assert_eq!(cache.get("k").await?, Some(Bytes::from_static(b"shallow")));
        assert!(b.operations().is_empty());
        Ok(())
    })
}

#[test]
fn empty_payload_is_a_hit() -> TestResult {
    block_on(async {
        let a = MockCertCache::with_entry("k", Bytes::new());
        let b = MockCertCache::with_entry("k", "deep");
        let cache = layered(WritePolicy::DeepFirst, &[&a, &b]);

        assert_eq!(cache.get("k").await?, Some(Bytes::new()));
        assert!(b.operations().is_empty());
        Ok(())
    })
}

#[test]
fn get_skips_failing_layers() -> TestResult {
    block_on(async {
        let a = MockCertCache::with_entry("k", "unreachable");
        a.fail_when(|_| true);
        let b = MockCertCache::with_entry("k", "deep");
        let cache = layered(WritePolicy::DeepFirst, &[&a, &b]);

        assert_eq!(cache.get("k").await?, Some(Bytes::from_static(b"deep")));
        assert_eq!(a.operations(), vec![get("k")]);
        Ok(())
    })
}

#[test]
fn get_with_every_layer_failing_is_none() -> TestResult {
    block_on(async {
        let (a, b) = (MockCertCache::new(), MockCertCache::new());
        a.fail_when(|_| true);
        b.fail_when(|_| true);
        let cache = layered(WritePolicy::ShallowFirst, &[&a, &b]);

        assert_eq!(cache.get("k").await?, None);
        Ok(())
    })
}

#[test]
fn deep_first_put_writes_deepest_first() -> TestResult {
    block_on(async {
        let (a, b, c) = (MockCertCache::new(), MockCertCache::new(), MockCertCache::new());
        let cache = layered(WritePolicy::DeepFirst, &[&a, &b, &c]);

        cache.put("k", Bytes::from_static(b"v")).await?;

        for layer in [&a, &b, &c] {
            assert_eq!(layer.writes(), vec![put("k", b"v")]);
        }
        Ok(())
    })
}

#[test]
fn deep_first_put_aborts_before_shallower_layers() {
    block_on(async {
        let a = MockCertCache::new();
        let b = MockCertCache::new();
        b.fail_when(CacheOp::is_write);
        let c = MockCertCache::new();
        let cache = layered(WritePolicy::DeepFirst, &[&a, &b, &c]);

        let err = cache
            .put("k", Bytes::from_static(b"v"))
            .await
            .expect_err("middle layer fails");

        assert_eq!(err.kind(), ErrorKind::Backend);
        assert!(err.to_string().contains("mock: put failed"), "{err}");
        assert_eq!(c.peek("k"), Some(Bytes::from_static(b"v")));
        assert_eq!(b.writes(), vec![put("k", b"v")]);
        assert!(a.operations().is_empty());
    });
}

#[test]
fn shallow_first_put_aborts_before_deeper_layers() {
    block_on(async {
        let a = MockCertCache::new();
        a.fail_when(CacheOp::is_write);
        let b = MockCertCache::new();
        let cache = layered(WritePolicy::ShallowFirst, &[&a, &b]);

        let err = cache
            .put("k", Bytes::from_static(b"v"))
            .await
            .expect_err("shallow layer fails");

        assert!(err.is_backend());
        assert!(b.operations().is_empty());
        assert!(!a.contains_key("k"));
    });
}

#[test]
fn shallow_first_put_visits_in_declared_order() -> TestResult {
    block_on(async {
        let (a, b) = (MockCertCache::new(), MockCertCache::new());
        b.fail_when(CacheOp::is_write);
        let cache = layered(WritePolicy::ShallowFirst, &[&a, &b]);

        assert!(cache.put("k", Bytes::from_static(b"v")).await.is_err());

        // The shallow layer was written before the deep one failed.
        assert_eq!(a.peek("k"), Some(Bytes::from_static(b"v")));
        Ok(())
    })
}

#[test]
fn delete_follows_write_policy() {
    block_on(async {
        let a = MockCertCache::with_entry("k", "v");
        let b = MockCertCache::with_entry("k", "v");
        b.fail_when(CacheOp::is_write);
        let deep_first = layered(WritePolicy::DeepFirst, &[&a, &b]);

        assert!(deep_first.delete("k").await.is_err());
        assert!(a.contains_key("k"), "shallow layer must be untouched");
        assert!(a.operations().is_empty());

        let shallow_first = layered(WritePolicy::ShallowFirst, &[&a, &b]);
        assert!(shallow_first.delete("k").await.is_err());
        assert!(!a.contains_key("k"));
        assert_eq!(a.writes(), vec![delete("k")]);
    });
}

#[test]
fn shallow_first_delete_aborts_before_deeper_layers() {
    block_on(async {
        let a = MockCertCache::with_entry("k", "v");
        a.fail_when(CacheOp::is_write);
        let b = MockCertCache::with_entry("k", "v");
        let cache = layered(WritePolicy::ShallowFirst, &[&a, &b]);

        let err = cache.delete("k").await.expect_err("shallow layer fails");

        assert!(err.is_backend());
        assert!(b.operations().is_empty());
        assert!(b.contains_key("k"), "deep layer must be untouched");
    });
}

#[test]
fn delete_absent_key_succeeds() -> TestResult {
    block_on(async {
        let (a, b) = (MockCertCache::new(), MockCertCache::new());

        for policy in [WritePolicy::DeepFirst, WritePolicy::ShallowFirst] {
            let cache = layered(policy, &[&a, &b]);
            cache.delete("never-stored").await?;
        }

        assert_eq!(a.writes(), vec![delete("never-stored"), delete("never-stored")]);
        Ok(())
    })
}

#[test]
fn delete_then_get_misses() -> TestResult {
    block_on(async {
        let (a, b) = (MockCertCache::new(), MockCertCache::new());
        let cache = layered(WritePolicy::DeepFirst, &[&a, &b]);

        cache.put("k", Bytes::from_static(b"v")).await?;
        cache.delete("k").await?;

        assert_eq!(cache.get("k").await?, None);
        assert_eq!(a.entry_count() + b.entry_count(), 0);
        Ok(())
    })
}

#[test]
fn empty_chain_is_a_configuration_error() {
    let err = LayeredCertCache::builder(Clock::new_frozen())
        .build()
        .expect_err("zero layers");
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = LayeredCertCache::new(Clock::new_frozen(), Vec::new()).expect_err("zero layers");
    assert!(err.is_configuration());
}

#[test]
fn unknown_policy_name_fails_before_any_layer_is_touched() {
    let layer = MockCertCache::new();

    let result = "BREADTH_FIRST"
        .parse::<WritePolicy>()
        .and_then(|policy| LayeredCertCache::with_policy(Clock::new_frozen(), policy, [layer.clone().into_dynamic()]));

    let err = result.expect_err("unknown policy");
    assert!(err.is_configuration());
    assert!(layer.operations().is_empty());
}

#[test]
fn read_repair_always_fills_shallower_layers_only() -> TestResult {
    block_on(async {
        let a = MockCertCache::new();
        let b = MockCertCache::new();
        let c = MockCertCache::with_entry("k", "v");
        let cache = LayeredCertCache::builder(Clock::new_frozen())
            .layer(a.clone())
            .layer(b.clone())
            .layer(c.clone())
            .read_repair(ReadRepair::always())
            .build()?;

        assert_eq!(cache.get("k").await?, Some(Bytes::from_static(b"v")));

        assert_eq!(a.writes(), vec![put("k", b"v")]);
        assert_eq!(b.writes(), vec![put("k", b"v")]);
        assert!(c.writes().is_empty());

        // The repaired shallow layer now answers on its own.
        b.clear_operations();
        c.clear_operations();
        assert_eq!(cache.get("k").await?, Some(Bytes::from_static(b"v")));
        assert!(b.operations().is_empty());
        assert!(c.operations().is_empty());
        Ok(())
    })
}

#[test]
fn read_repair_never_leaves_layers_alone() -> TestResult {
    block_on(async {
        let a = MockCertCache::new();
        let b = MockCertCache::with_entry("k", "v");
        let cache = LayeredCertCache::builder(Clock::new_frozen())
            .layer(a.clone())
            .layer(b)
            .read_repair(ReadRepair::never())
            .build()?;

        cache.get("k").await?;
        cache.get("k").await?;

        assert!(a.writes().is_empty());
        assert_eq!(a.operations(), vec![get("k"), get("k")]);
        Ok(())
    })
}

#[test]
fn read_repair_when_filters_payloads() -> TestResult {
    block_on(async {
        let a = MockCertCache::new();
        let b = MockCertCache::with_data(
            [
                ("cert".to_owned(), Bytes::from_static(b"certificate")),
                ("cert+token".to_owned(), Bytes::from_static(b"nonce")),
            ]
            .into(),
        );
        let cache = LayeredCertCache::builder(Clock::new_frozen())
            .layer(a.clone())
            .layer(b)
            .read_repair(ReadRepair::when(|key, _| !key.ends_with("+token")))
            .build()?;

        cache.get("cert").await?;
        cache.get("cert+token").await?;

        assert!(a.contains_key("cert"));
        assert!(!a.contains_key("cert+token"));
        Ok(())
    })
}

#[test]
fn layered_cache_nests_as_a_layer() -> TestResult {
    block_on(async {
        let (a, b, c) = (MockCertCache::new(), MockCertCache::new(), MockCertCache::new());
        let inner = layered(WritePolicy::ShallowFirst, &[&b, &c]);
        let outer = LayeredCertCache::builder(Clock::new_frozen())
            .layer(a.clone())
            .named_layer("nested", inner)
            .build()?;

        outer.put("k", Bytes::from_static(b"v")).await?;
        for layer in [&a, &b, &c] {
            assert_eq!(layer.peek("k"), Some(Bytes::from_static(b"v")));
        }

        outer.delete("k").await?;
        assert_eq!(outer.get("k").await?, None);
        Ok(())
    })
}

#[test]
fn clones_share_the_chain() -> TestResult {
    block_on(async {
        let layer = MockCertCache::new();
        let cache = layered(WritePolicy::DeepFirst, &[&layer]);
        let clone = cache.clone();

        clone.put("k", Bytes::from_static(b"v")).await?;
        assert_eq!(cache.get("k").await?, Some(Bytes::from_static(b"v")));
        assert_eq!(clone.layer_count(), cache.layer_count());
        Ok(())
    })
}

#[tokio::test]
async fn concurrent_callers_share_one_cache() -> TestResult {
    let (a, b) = (MockCertCache::new(), MockCertCache::new());
    let cache = layered(WritePolicy::DeepFirst, &[&a, &b]);

    let writers = (0..8).map(|i| {
        let cache = cache.clone();
        async move { cache.put(&format!("domain{i}.example"), Bytes::from(vec![i; 4])).await }
    });
    for result in futures::future::join_all(writers).await {
        result?;
    }

    assert_eq!(a.entry_count(), 8);
    assert_eq!(b.entry_count(), 8);
    assert_eq!(cache.get("domain3.example").await?, Some(Bytes::from(vec![3_u8; 4])));
    Ok(())
}
