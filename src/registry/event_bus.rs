use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::trace;

use crate::core::chain_error::Result;
use crate::core::dispatch_outcome::DispatchOutcome;
use crate::events::event::{Category, Event};

/// Order in which a host runs the executors registered for one category
///
/// Executors run from `Lowest` to `Monitor`; executors with equal priority
/// run in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DeliveryPriority {
    Lowest,
    Low,
    #[default]
    Normal,
    High,
    Highest,
    /// Runs last, after every other priority
    Monitor,
}

/// Type-erased entry point a host calls for each delivered event
pub trait EventExecutor: Send + Sync {
    fn execute(&self, event: &mut dyn Event) -> Result<DispatchOutcome>;
}

/// The host's event-delivery mechanism
///
/// The registry calls [`register`](Self::register) exactly once per category,
/// when that category's chain is created.
pub trait EventDelivery: Send + Sync {
    fn register(&self, category: Category, priority: DeliveryPriority, executor: Arc<dyn EventExecutor>);
}

struct Registration {
    priority: DeliveryPriority,
    executor: Arc<dyn EventExecutor>,
}

/// In-process host that delivers published events to registered executors
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(EventBus::new());
/// let registry = ChainRegistry::new(bus.clone());
///
/// registry.chain::<PlayerJoin>()?.write().add_first("greet", greet)?;
///
/// let mut event = PlayerJoin::new("alex");
/// bus.publish(&mut event)?;
/// ```
#[derive(Default)]
pub struct EventBus {
    executors: RwLock<HashMap<TypeId, Vec<Registration>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every executor registered for its category
    pub fn publish<E: Event>(&self, event: &mut E) -> Result<Vec<DispatchOutcome>> {
        self.deliver(&Category::of::<E>(), event)
    }

    /// Deliver `event` to the executors registered for `category`
    ///
    /// The executor list is copied before delivery, so executors may publish
    /// further events or register new categories.
    pub fn deliver(&self, category: &Category, event: &mut dyn Event) -> Result<Vec<DispatchOutcome>> {
        let executors: Vec<Arc<dyn EventExecutor>> = self
            .executors
            .read()
            .get(&category.id())
            .map(|registrations| {
                registrations
                    .iter()
                    .map(|registration| Arc::clone(&registration.executor))
                    .collect()
            })
            .unwrap_or_default();

        trace!(category = %category, executors = executors.len(), "delivering event");

        let mut outcomes = Vec::with_capacity(executors.len());
        for executor in executors {
            outcomes.push(executor.execute(event)?);
        }
        Ok(outcomes)
    }

    /// Number of executors registered for `category`
    pub fn executors(&self, category: &Category) -> usize {
        self.executors
            .read()
            .get(&category.id())
            .map_or(0, Vec::len)
    }
}

impl EventDelivery for EventBus {
    fn register(&self, category: Category, priority: DeliveryPriority, executor: Arc<dyn EventExecutor>) {
        let mut executors = self.executors.write();
        let registrations = executors.entry(category.id()).or_default();
        let at = registrations.partition_point(|registration| registration.priority <= priority);
        registrations.insert(at, Registration { priority, executor });
        trace!(category = %category, ?priority, "executor registered");
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("categories", &self.executors.read().len())
            .finish()
    }
}
