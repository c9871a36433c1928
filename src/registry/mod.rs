/// Category to chain mapping and shared chain handles
pub mod chain_registry;

/// Host delivery seam and an in-process event bus
pub mod event_bus;
