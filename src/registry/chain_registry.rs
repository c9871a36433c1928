use std::any::Any;
use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::core::chain_error::{ChainError, Result};
use crate::core::dispatch_outcome::DispatchOutcome;
use crate::core::handler_chain::HandlerChain;
use crate::events::event::{AsAny, Category, Event};
use crate::registry::event_bus::{DeliveryPriority, EventDelivery, EventExecutor};

/// A handler chain shared between wiring code and the host
///
/// Mutation goes through [`write`](Self::write), dispatch takes a read lock,
/// so the topology never changes under an in-flight dispatch. Dispatch
/// uses a recursive read lock: a handler may dispatch another event into the
/// same chain, but it must not mutate the chain that is calling it, which
/// would deadlock.
pub struct SharedChain<E> {
    category: Category,
    inner: Arc<RwLock<HandlerChain<E>>>,
}

impl<E: Event> SharedChain<E> {
    pub fn new(chain: HandlerChain<E>) -> Self {
        Self {
            category: *chain.category(),
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Lock the chain for queries
    pub fn read(&self) -> RwLockReadGuard<'_, HandlerChain<E>> {
        self.inner.read()
    }

    /// Lock the chain for mutation
    ///
    /// ```ignore
    /// registry
    ///     .chain::<CommandPreprocess>()?
    ///     .write()
    ///     .add_first("block_plugin_commands", block_plugin_commands)?
    ///     .add_after("block_plugin_commands", "inform_command", inform_command)?;
    /// ```
    pub fn write(&self) -> RwLockWriteGuard<'_, HandlerChain<E>> {
        self.inner.write()
    }

    pub fn dispatch(&self, event: &mut E) -> Result<DispatchOutcome> {
        self.inner.read_recursive().dispatch(event)
    }
}

impl<E> Clone for SharedChain<E> {
    fn clone(&self) -> Self {
        Self {
            category: self.category,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Event> EventExecutor for SharedChain<E> {
    fn execute(&self, event: &mut dyn Event) -> Result<DispatchOutcome> {
        let found = AsAny::event_type_name(&*event);
        match event.as_any_mut().downcast_mut::<E>() {
            Some(event) => self.dispatch(event),
            None => Err(ChainError::TypeMismatch {
                expected: self.category.type_name(),
                found,
            }),
        }
    }
}

impl<E: Event> fmt::Debug for SharedChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.read(), f)
    }
}

struct Entry {
    category: Category,
    chain: Box<dyn Any + Send + Sync>,
}

impl Entry {
    fn resolve<E: Event>(&self, requested: &Category) -> Result<SharedChain<E>> {
        let conflict = || ChainError::TypeConflict {
            name: requested.name(),
            registered: self.category.type_name(),
            requested: requested.type_name(),
        };

        if self.category != *requested {
            return Err(conflict());
        }
        self.chain
            .downcast_ref::<SharedChain<E>>()
            .cloned()
            .ok_or_else(conflict)
    }
}

/// One handler chain per event category, created on first request
///
/// Creating a chain also registers it with the host's [`EventDelivery`], so
/// events published there flow through the chain from then on. Lookups take
/// a read lock; creation upgrades to the write lock and checks again, so each
/// category is created and registered exactly once.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(EventBus::new());
/// let registry = ChainRegistry::new(bus.clone()).with_priority(DeliveryPriority::Monitor);
///
/// registry
///     .chain::<PlayerJoin>()?
///     .write()
///     .add_first("block_join_message", block_join_message)?
///     .add_before("block_join_message", "send_greeting", send_greeting)?;
/// ```
pub struct ChainRegistry {
    delivery: Arc<dyn EventDelivery>,
    priority: DeliveryPriority,
    chains: RwLock<HashMap<&'static str, Entry>>,
}

impl ChainRegistry {
    /// Create a registry that hands new chains to `delivery`
    ///
    /// Chains register at [`DeliveryPriority::Monitor`] unless configured
    /// otherwise.
    pub fn new(delivery: Arc<dyn EventDelivery>) -> Self {
        Self {
            delivery,
            priority: DeliveryPriority::Monitor,
            chains: RwLock::new(HashMap::new()),
        }
    }

    /// Set the priority new chains register with
    pub fn with_priority(mut self, priority: DeliveryPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn priority(&self) -> DeliveryPriority {
        self.priority
    }

    /// The chain for `E`, created and registered with the host on first use
    ///
    /// Fails with [`ChainError::TypeConflict`] when another event type
    /// already owns `E`'s category name.
    pub fn chain<E: Event>(&self) -> Result<SharedChain<E>> {
        let category = Category::of::<E>();

        if let Some(entry) = self.chains.read().get(category.name()) {
            return entry.resolve(&category);
        }

        let mut chains = self.chains.write();
        if let Some(entry) = chains.get(category.name()) {
            return entry.resolve(&category);
        }

        let chain = SharedChain::new(HandlerChain::<E>::new());
        self.delivery
            .register(category, self.priority, Arc::new(chain.clone()));
        chains.insert(
            category.name(),
            Entry {
                category,
                chain: Box::new(chain.clone()),
            },
        );
        debug!(category = %category, priority = ?self.priority, "chain created");

        Ok(chain)
    }

    /// Whether a chain for `E`'s category name exists
    pub fn contains<E: Event>(&self) -> bool {
        self.chains.read().contains_key(E::category_name())
    }

    pub fn len(&self) -> usize {
        self.chains.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.read().is_empty()
    }

    /// Categories that currently have a chain
    pub fn categories(&self) -> Vec<Category> {
        self.chains
            .read()
            .values()
            .map(|entry| entry.category)
            .collect()
    }
}

impl fmt::Debug for ChainRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainRegistry")
            .field("priority", &self.priority)
            .field("categories", &self.len())
            .finish()
    }
}
