use std::time::{Duration, Instant};

use crate::events::dispatch_middleware::{DispatchMiddleware, HandlerCall};
use crate::events::event_handler::HandlerResult;

/// Middleware that measures and logs handler execution time
///
/// # Example
///
/// ```ignore
/// use event_pipeline::middleware::timing::TimingMiddleware;
/// use std::time::Duration;
///
/// // Only log slow handlers (> 5ms)
/// let chain = HandlerChain::<PlayerJoin>::new()
///     .middleware(TimingMiddleware::new().with_threshold(Duration::from_millis(5)));
/// ```
pub struct TimingMiddleware {
    threshold: Option<Duration>,
}

impl TimingMiddleware {
    /// Create a new timing middleware that logs every handler duration
    pub fn new() -> Self {
        Self { threshold: None }
    }

    /// Only log handlers that take at least `threshold`
    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = Some(threshold);
        self
    }

    fn should_log(&self, duration: Duration) -> bool {
        match self.threshold {
            Some(threshold) => duration >= threshold,
            None => true,
        }
    }

    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();
        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", duration.as_secs_f64())
        }
    }
}

impl DispatchMiddleware for TimingMiddleware {
    fn handle(
        &self,
        call: &HandlerCall<'_>,
        next: &mut dyn FnMut() -> HandlerResult,
    ) -> HandlerResult {
        let start = Instant::now();
        let result = next();
        let duration = start.elapsed();

        if self.should_log(duration) {
            tracing::info!(
                category = call.category.name(),
                node = call.node,
                elapsed = %Self::format_duration(duration),
                "handler timing"
            );
        }

        result
    }
}

impl Default for TimingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}
