use std::sync::Arc;
use std::time::Instant;

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::events::dispatch_middleware::{DispatchMiddleware, HandlerCall};
use crate::events::event_handler::HandlerResult;

/// Statistics for a single chain node
#[derive(Debug, Clone)]
pub struct NodeMetrics {
    pub category: &'static str,
    pub node: String,
    pub total_invocations: u64,
    pub successful_invocations: u64,
    pub failed_invocations: u64,
    pub total_duration_micros: u64,
    pub min_duration_micros: u64,
    pub max_duration_micros: u64,
}

impl NodeMetrics {
    fn new(category: &'static str, node: String) -> Self {
        Self {
            category,
            node,
            total_invocations: 0,
            successful_invocations: 0,
            failed_invocations: 0,
            total_duration_micros: 0,
            min_duration_micros: u64::MAX,
            max_duration_micros: 0,
        }
    }

    fn record(&mut self, duration_micros: u64, success: bool) {
        self.total_invocations += 1;
        if success {
            self.successful_invocations += 1;
        } else {
            self.failed_invocations += 1;
        }

        self.total_duration_micros += duration_micros;
        self.min_duration_micros = self.min_duration_micros.min(duration_micros);
        self.max_duration_micros = self.max_duration_micros.max(duration_micros);
    }

    /// Average invocation time in microseconds
    pub fn avg_duration_micros(&self) -> u64 {
        if self.total_invocations == 0 {
            0
        } else {
            self.total_duration_micros / self.total_invocations
        }
    }

    /// Success rate as a percentage (0.0 - 100.0)
    pub fn success_rate(&self) -> f64 {
        if self.total_invocations == 0 {
            0.0
        } else {
            (self.successful_invocations as f64 / self.total_invocations as f64) * 100.0
        }
    }
}

/// Middleware that collects per-node invocation metrics
///
/// Clones share the same storage, so keep one clone to read the numbers
/// after handing the other to a chain. Nodes are keyed by category and
/// node name as spelled at insertion.
///
/// # Example
///
/// ```ignore
/// let metrics = MetricsMiddleware::new();
/// let chain = HandlerChain::<PlayerJoin>::new().middleware(metrics.clone());
///
/// chain.dispatch(&mut event)?;
/// metrics.log_summary();
/// ```
#[derive(Clone, Default)]
pub struct MetricsMiddleware {
    metrics: Arc<Mutex<HashMap<(&'static str, String), NodeMetrics>>>,
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics for one node of a category
    pub fn get_metrics(&self, category: &str, node: &str) -> Option<NodeMetrics> {
        self.metrics
            .lock()
            .values()
            .find(|metrics| metrics.category == category && metrics.node == node)
            .cloned()
    }

    /// All collected metrics, sorted by category then node
    pub fn get_all_metrics(&self) -> Vec<NodeMetrics> {
        let mut all: Vec<NodeMetrics> = self.metrics.lock().values().cloned().collect();
        all.sort_by(|a, b| (a.category, &a.node).cmp(&(b.category, &b.node)));
        all
    }

    pub fn reset(&self) {
        self.metrics.lock().clear();
    }

    /// Emit one `tracing` event per node with its aggregated numbers
    pub fn log_summary(&self) {
        for metric in self.get_all_metrics() {
            tracing::info!(
                category = metric.category,
                node = %metric.node,
                total = metric.total_invocations,
                failed = metric.failed_invocations,
                avg_micros = metric.avg_duration_micros(),
                min_micros = metric.min_duration_micros,
                max_micros = metric.max_duration_micros,
                success_rate = metric.success_rate(),
                "handler metrics"
            );
        }
    }
}

impl DispatchMiddleware for MetricsMiddleware {
    fn handle(
        &self,
        call: &HandlerCall<'_>,
        next: &mut dyn FnMut() -> HandlerResult,
    ) -> HandlerResult {
        let start = Instant::now();
        let result = next();
        let duration = start.elapsed();

        let category = call.category.name();
        self.metrics
            .lock()
            .entry((category, call.node.to_string()))
            .or_insert_with(|| NodeMetrics::new(category, call.node.to_string()))
            .record(duration.as_micros() as u64, result.is_ok());

        result
    }
}
