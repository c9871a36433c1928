/// Event trait, categories and suppression
pub mod event;

/// Handler trait and closure adapter
pub mod event_handler;

/// Middleware wrapped around handler invocations
pub mod dispatch_middleware;
