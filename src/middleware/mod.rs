/// Logging middleware for handler invocations
#[cfg(feature = "logging")]
pub mod logging;

/// Timing/performance measurement middleware
#[cfg(feature = "timing")]
pub mod timing;

/// Per-node metrics collection middleware
#[cfg(feature = "metrics")]
pub mod metrics;
