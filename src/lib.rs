//! Event Pipeline - named, ordered handler chains per event category
//!
//! Each event category gets exactly one [`HandlerChain`]: a doubly-linked
//! sequence of named handlers that can be reshaped at runtime (insert
//! first/last/before/after a named node, remove, replace in place). Dispatch
//! walks the chain head to tail and, for cancellable categories, stops as
//! soon as a handler suppresses the event.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use event_pipeline::{ChainRegistry, EventBus, HandlerResult};
//!
//! let bus = Arc::new(EventBus::new());
//! let registry = ChainRegistry::new(bus.clone());
//!
//! registry
//!     .chain::<PlayerJoin>()?
//!     .write()
//!     .add_first("block_join_message", |event: &mut PlayerJoin| -> HandlerResult {
//!         event.join_message = None;
//!         Ok(())
//!     })?
//!     .add_before("block_join_message", "send_greeting", send_greeting)?;
//!
//! let mut event = PlayerJoin::new("alex");
//! bus.publish(&mut event)?;
//! ```

pub mod core;
pub mod events;
pub mod middleware;
pub mod registry;

// Convenience re-exports
pub use crate::core::chain_error::{ChainError, Result};
pub use crate::core::chain_node::{ChainNode, Handler, NodeId};
pub use crate::core::dispatch_outcome::{DispatchOutcome, DispatchStatus};
pub use crate::core::handler_chain::HandlerChain;
pub use events::dispatch_middleware::{DispatchMiddleware, HandlerCall};
pub use events::event::{Cancellable, Category, Event, Suppression};
pub use events::event_handler::{EventHandler, HandlerError, HandlerResult};
pub use registry::chain_registry::{ChainRegistry, SharedChain};
pub use registry::event_bus::{DeliveryPriority, EventBus, EventDelivery, EventExecutor};
