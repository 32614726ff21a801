//! Job counters and the pull-based endpoint that exposes them.
//!
//! Jobs only see the [`MetricsSink`] trait. The Prometheus-backed sink and its
//! HTTP listener are compiled in with the `metrics` feature; without it every
//! increment is a no-op and no listener is started.

#[cfg(feature = "metrics")]
pub mod registry;
#[cfg(feature = "metrics")]
pub mod server;

use std::net::SocketAddr;
use std::sync::Arc;

/// The two process-wide job counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCounter {
    /// Backup jobs that completed (dry-run, uploaded or local)
    JobsTotal,
    /// Backup jobs that ended in failure
    JobsFailed,
}

/// Destination for job counter increments.
///
/// Implementations must tolerate concurrent increments and reads.
pub trait MetricsSink: Send + Sync {
    fn increment(&self, counter: JobCounter);
}

/// Sink used when metrics are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment(&self, _counter: JobCounter) {}
}

/// Result of [`start`]: the sink to hand to jobs, and where the endpoint
/// listens if one was started.
pub struct MetricsHandle {
    pub sink: Arc<dyn MetricsSink>,
    pub endpoint: Option<SocketAddr>,
}

/// Create the counter registry and start the `/metrics` listener.
///
/// The listener runs on a detached task and has no shutdown path; it lives
/// until the process exits. A failed bind is logged and the counters keep
/// working without an endpoint.
#[cfg(feature = "metrics")]
pub async fn start(host: &str, port: u16) -> MetricsHandle {
    let metrics = match registry::PrometheusMetrics::new() {
        Ok(metrics) => metrics,
        Err(e) => {
            tracing::warn!("Failed to create metrics registry, metrics disabled: {}", e);
            return disabled();
        }
    };

    let endpoint = match server::serve(host, port, metrics.clone()).await {
        Ok(addr) => Some(addr),
        Err(e) => {
            tracing::warn!("Failed to start metrics listener on {}:{}: {}", host, port, e);
            None
        }
    };

    MetricsHandle {
        sink: Arc::new(metrics),
        endpoint,
    }
}

#[cfg(not(feature = "metrics"))]
pub async fn start(_host: &str, _port: u16) -> MetricsHandle {
    tracing::debug!("Built without the metrics feature, counters are no-ops");
    disabled()
}

fn disabled() -> MetricsHandle {
    MetricsHandle {
        sink: Arc::new(NoopMetrics),
        endpoint: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_sink_accepts_increments() {
        let sink: Arc<dyn MetricsSink> = Arc::new(NoopMetrics);
        sink.increment(JobCounter::JobsTotal);
        sink.increment(JobCounter::JobsFailed);
    }

    #[cfg(feature = "metrics")]
    #[tokio::test]
    async fn test_start_binds_endpoint() {
        let handle = start("127.0.0.1", 0).await;
        let addr = handle.endpoint.expect("listener should bind an ephemeral port");
        assert_ne!(addr.port(), 0);
        handle.sink.increment(JobCounter::JobsTotal);
    }
}
