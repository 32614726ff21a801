//! Prometheus registry holding the job counters.

use super::{JobCounter, MetricsSink};
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

pub const JOBS_TOTAL: &str = "backup_jobs_total";
/// Named after the `jobs_failed_total` counter, in the same plural form as
/// [`JOBS_TOTAL`]. Dashboards scraping the older `backup_job_failed_total`
/// series need their queries updated.
pub const JOBS_FAILED_TOTAL: &str = "backup_jobs_failed_total";

/// Counter registry owned by one process. Clones share the same counters.
#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    jobs_total: IntCounter,
    jobs_failed: IntCounter,
}

impl PrometheusMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let jobs_total = IntCounter::new(JOBS_TOTAL, "Total backup jobs run")?;
        let jobs_failed = IntCounter::new(JOBS_FAILED_TOTAL, "Total failed backup jobs")?;

        registry.register(Box::new(jobs_total.clone()))?;
        registry.register(Box::new(jobs_failed.clone()))?;

        Ok(Self {
            registry,
            jobs_total,
            jobs_failed,
        })
    }

    /// Current value of a counter.
    pub fn get(&self, counter: JobCounter) -> u64 {
        self.counter(counter).get()
    }

    /// Render every counter in the text exposition format.
    pub fn render(&self) -> prometheus::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }

    /// `Content-Type` of [`render`](Self::render) output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    fn counter(&self, counter: JobCounter) -> &IntCounter {
        match counter {
            JobCounter::JobsTotal => &self.jobs_total,
            JobCounter::JobsFailed => &self.jobs_failed,
        }
    }
}

impl MetricsSink for PrometheusMetrics {
    fn increment(&self, counter: JobCounter) {
        self.counter(counter).inc();
    }
}
