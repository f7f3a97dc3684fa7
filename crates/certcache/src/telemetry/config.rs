// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Telemetry configuration for layered caches.

#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Meter, MeterProvider};

use crate::telemetry::CacheTelemetry;

/// Configuration for layered cache telemetry.
///
/// Everything is disabled by default. Enable logs and/or metrics with the
/// builder methods, then pass this to [`LayeredCertCacheBuilder::telemetry`].
///
/// [`LayeredCertCacheBuilder::telemetry`]: crate::LayeredCertCacheBuilder::telemetry
///
/// # Examples
///
/// ```ignore
/// use certcache::TelemetryConfig;
///
/// let config = TelemetryConfig::new()
///     .with_logs()
///     .with_metrics(&meter_provider);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TelemetryConfig {
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<Meter>,
}

impl TelemetryConfig {
    /// Creates a configuration with everything disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables a structured `tracing` event for every layer call.
    #[cfg(any(feature = "logs", test))]
    #[must_use]
    pub fn with_logs(self) -> Self {
        Self {
            logs_enabled: true,
            ..self
        }
    }

    /// Enables OpenTelemetry metrics recorded through `provider`.
    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub fn with_metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.meter = Some(crate::telemetry::metrics::create_meter(provider));
        self
    }

    pub(crate) fn build(self) -> CacheTelemetry {
        #[cfg(any(feature = "metrics", test))]
        let (event_counter, operation_duration) = {
            use crate::telemetry::metrics::{create_event_counter, create_operation_duration_histogram};
            (
                self.meter.as_ref().map(create_event_counter),
                self.meter.as_ref().map(create_operation_duration_histogram),
            )
        };

        CacheTelemetry {
            #[cfg(any(feature = "logs", test))]
            logs_enabled: self.logs_enabled,
            #[cfg(any(feature = "metrics", test))]
            event_counter,
            #[cfg(any(feature = "metrics", test))]
            operation_duration,
        }
    }
}
