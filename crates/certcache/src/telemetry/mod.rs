// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Telemetry for layered certificate caches.
//!
//! Every call a layered cache makes into one of its layers is recorded as a
//! cache event: a structured `tracing` event when the `logs` feature is on, and
//! OpenTelemetry counter and histogram samples when the `metrics` feature is on.

use std::time::Duration;

#[cfg(any(feature = "metrics", test))]
use opentelemetry::{
    KeyValue,
    metrics::{Counter, Histogram},
};

use crate::{CacheOperation, Error};

pub(crate) mod attributes;
mod config;
pub(crate) mod ext;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

pub use config::TelemetryConfig;

/// Identifies the layer a cache event belongs to.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    not(any(feature = "logs", feature = "metrics", test)),
    expect(dead_code, reason = "read only by logs and metrics")
)]
pub(crate) struct LayerScope<'a> {
    pub cache: &'a str,
    pub layer: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    Stored,
    Deleted,
    Repaired,
    Error,
}

#[cfg(any(feature = "logs", test))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Debug,
    Info,
    Error,
}

impl CacheActivity {
    #[cfg(any(feature = "logs", feature = "metrics", test))]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Stored => "cache.stored",
            Self::Deleted => "cache.deleted",
            Self::Repaired => "cache.repaired",
            Self::Error => "cache.error",
        }
    }

    #[cfg(any(feature = "logs", test))]
    fn severity(self) -> Severity {
        match self {
            Self::Hit | Self::Miss => Severity::Debug,
            Self::Stored | Self::Deleted | Self::Repaired => Severity::Info,
            Self::Error => Severity::Error,
        }
    }
}

/// Records cache events for one layered cache.
///
/// A default instance records nothing.
#[derive(Clone, Debug, Default)]
pub(crate) struct CacheTelemetry {
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    event_counter: Option<Counter<u64>>,
    #[cfg(any(feature = "metrics", test))]
    operation_duration: Option<Histogram<f64>>,
}

impl CacheTelemetry {
    /// Records a successful layer call.
    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(unused_variables, reason = "no-op when telemetry is disabled")
    )]
    pub(crate) fn record(&self, scope: LayerScope<'_>, operation: CacheOperation, activity: CacheActivity, duration: Duration) {
        #[cfg(any(feature = "metrics", test))]
        self.record_metrics(scope, operation, activity, duration);

        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            Self::emit(scope, operation, activity, duration, None);
        }
    }

    /// Records a failed layer call along with its error.
    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, reason = "the error is only written to logs")
    )]
    pub(crate) fn record_error(&self, scope: LayerScope<'_>, operation: CacheOperation, duration: Duration, error: &Error) {
        #[cfg(any(feature = "metrics", test))]
        self.record_metrics(scope, operation, CacheActivity::Error, duration);

        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            Self::emit(scope, operation, CacheActivity::Error, duration, Some(error));
        }
    }

    #[cfg(any(feature = "metrics", test))]
    fn record_metrics(&self, scope: LayerScope<'_>, operation: CacheOperation, activity: CacheActivity, duration: Duration) {
        if self.event_counter.is_none() && self.operation_duration.is_none() {
            return;
        }

        let attrs = [
            KeyValue::new(attributes::CACHE_NAME, scope.cache.to_owned()),
            KeyValue::new(attributes::CACHE_LAYER_NAME, scope.layer.to_owned()),
            KeyValue::new(attributes::CACHE_OPERATION_NAME, operation.as_str()),
            KeyValue::new(attributes::CACHE_ACTIVITY_NAME, activity.as_str()),
        ];

        if let Some(c) = &self.event_counter {
            c.add(1, &attrs);
        }

        if let Some(h) = &self.operation_duration {
            h.record(duration.as_secs_f64(), &attrs);
        }
    }

    #[cfg(any(feature = "logs", test))]
    fn emit(scope: LayerScope<'_>, operation: CacheOperation, activity: CacheActivity, duration: Duration, error: Option<&Error>) {
        let op = operation.as_str();
        let ev = activity.as_str();
        let duration_ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        let error = error.map(tracing::field::display);

        // Tracing levels must be constant, hence one macro arm per severity.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    cache.name = scope.cache,
                    cache.layer = scope.layer,
                    cache.operation = op,
                    cache.activity = ev,
                    cache.duration_ns = duration_ns,
                    error = error,
                    "cache.event"
                )
            };
        }

        match activity.severity() {
            Severity::Error => emit_event!(error),
            Severity::Info => emit_event!(info),
            Severity::Debug => emit_event!(debug),
        }
    }
}
