use crate::events::dispatch_middleware::{DispatchMiddleware, HandlerCall};
use crate::events::event_handler::HandlerResult;

/// Logging levels for the middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Middleware that logs every handler invocation through `tracing`
///
/// Start messages are logged at `Debug`, completions at `Info` and failures
/// at `Error`; anything below the configured level is skipped. The
/// middleware never changes the handler's result.
///
/// # Example
///
/// ```ignore
/// use event_pipeline::middleware::logging::{LoggingMiddleware, LogLevel};
///
/// let chain = HandlerChain::<PlayerJoin>::new()
///     .middleware(LoggingMiddleware::new(LogLevel::Info));
/// ```
pub struct LoggingMiddleware {
    level: LogLevel,
    log_success: bool,
    log_failure: bool,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with the specified log level
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            log_success: true,
            log_failure: true,
        }
    }

    /// Create a logging middleware that only logs failures
    pub fn errors_only() -> Self {
        Self {
            level: LogLevel::Error,
            log_success: false,
            log_failure: true,
        }
    }

    /// Create a logging middleware with info level (default)
    pub fn info() -> Self {
        Self::new(LogLevel::Info)
    }

    /// Create a logging middleware with debug level
    pub fn debug() -> Self {
        Self::new(LogLevel::Debug)
    }

    /// Configure whether to log successful invocations
    pub fn with_success_logging(mut self, enabled: bool) -> Self {
        self.log_success = enabled;
        self
    }

    /// Configure whether to log failures
    pub fn with_failure_logging(mut self, enabled: bool) -> Self {
        self.log_failure = enabled;
        self
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    fn log(&self, level: LogLevel, call: &HandlerCall<'_>, message: &str) {
        if !self.should_log(level) {
            return;
        }

        let category = call.category.name();
        let node = call.node;
        match level {
            LogLevel::Debug => tracing::debug!(category, node, "{message}"),
            LogLevel::Info => tracing::info!(category, node, "{message}"),
            LogLevel::Warn => tracing::warn!(category, node, "{message}"),
            LogLevel::Error => tracing::error!(category, node, "{message}"),
        }
    }
}

impl DispatchMiddleware for LoggingMiddleware {
    fn handle(
        &self,
        call: &HandlerCall<'_>,
        next: &mut dyn FnMut() -> HandlerResult,
    ) -> HandlerResult {
        self.log(LogLevel::Debug, call, "starting handler");

        let result = next();

        match &result {
            Ok(()) if self.log_success => self.log(LogLevel::Info, call, "handler completed"),
            Err(err) if self.log_failure => {
                self.log(LogLevel::Error, call, &format!("handler failed: {err}"))
            }
            _ => {}
        }

        result
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::info()
    }
}
