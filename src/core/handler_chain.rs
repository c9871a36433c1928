use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use tracing::debug;

use crate::core::chain_error::{ChainError, Result};
use crate::core::chain_node::{ChainNode, Handler, NodeId};
use crate::events::dispatch_middleware::DispatchMiddleware;
use crate::events::event::{Category, Event, Suppression};
use crate::events::event_handler::EventHandler;

static NEXT_CHAIN_ID: AtomicU64 = AtomicU64::new(1);

struct Slot<E> {
    generation: u32,
    node: Option<ChainNode<E>>,
}

/// Ordered, named handlers for one event category
///
/// Nodes live in an arena and link to each other by slot index, so the
/// chain owns every node and `prev` links never form ownership cycles. A
/// case-folded name index makes lookups case-insensitive and O(1).
///
/// # Handler Execution Order
///
/// Handlers run head to tail. Positions are chosen at insertion time:
///
/// * [`add_first`](Self::add_first) / [`add_last`](Self::add_last) - new head / tail
/// * [`add_before`](Self::add_before) / [`add_after`](Self::add_after) - next to a named node
///
/// # Example
///
/// ```ignore
/// let mut chain = HandlerChain::<PlayerJoin>::new();
/// chain
///     .add_first("block_join_message", block_join_message)?
///     .add_before("block_join_message", "send_greeting", send_greeting)?;
///
/// assert_eq!(chain.names(), ["send_greeting", "block_join_message"]);
/// ```
pub struct HandlerChain<E> {
    id: u64,
    category: Category,
    pub(crate) suppression: Option<Suppression<E>>,
    slots: Vec<Slot<E>>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    index: HashMap<String, u32>,
    pub(crate) middlewares: Vec<Arc<dyn DispatchMiddleware>>,
}

/// Case-fold a node name one `char` at a time
///
/// Each char is upper-cased (single-char mappings only), then lower-cased,
/// so `"İ"` folds to `"i"` and `"ß"` does not match `"ss"`.
fn name_key(name: &str) -> String {
    name.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    let mut upper = c.to_uppercase();
    let upper = match (upper.next(), upper.next()) {
        (Some(upper), None) => upper,
        _ => c,
    };
    // U+0130 is the only char that lower-cases to two; its first is 'i'.
    upper.to_lowercase().next().unwrap_or(upper)
}

impl<E: Event> HandlerChain<E> {
    /// Create an empty chain for `E`'s category
    pub fn new() -> Self {
        Self {
            id: NEXT_CHAIN_ID.fetch_add(1, Ordering::Relaxed),
            category: Category::of::<E>(),
            suppression: E::suppression(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            index: HashMap::new(),
            middlewares: Vec::new(),
        }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Whether dispatch stops once the event is suppressed
    pub fn is_cancellable(&self) -> bool {
        self.suppression.is_some()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Add a middleware around every handler invocation (fluent API - consumes self)
    ///
    /// Middlewares execute in **reverse order** of registration: the last one
    /// added is the outermost layer.
    pub fn middleware<M: DispatchMiddleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Add a middleware to a chain that is already in use
    pub fn use_middleware<M: DispatchMiddleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    /// Insert a new head node
    ///
    /// Fails with [`ChainError::InvalidArgument`] if `name` is empty or
    /// already present (case-insensitive).
    pub fn add_first<H>(&mut self, name: &str, handler: H) -> Result<&mut Self>
    where
        H: EventHandler<E> + 'static,
    {
        let key = self.check_new_name(name, None)?;
        let head = self.head;
        self.splice(key, name, Arc::new(handler), None, head)?;
        debug!(category = %self.category, node = name, "added first");
        Ok(self)
    }

    /// Insert a new tail node
    pub fn add_last<H>(&mut self, name: &str, handler: H) -> Result<&mut Self>
    where
        H: EventHandler<E> + 'static,
    {
        let key = self.check_new_name(name, None)?;
        let tail = self.tail;
        self.splice(key, name, Arc::new(handler), tail, None)?;
        debug!(category = %self.category, node = name, "added last");
        Ok(self)
    }

    /// Insert a node directly before the node named `anchor`
    ///
    /// Fails with [`ChainError::NotFound`] if `anchor` is not in the chain.
    pub fn add_before<H>(&mut self, anchor: &str, name: &str, handler: H) -> Result<&mut Self>
    where
        H: EventHandler<E> + 'static,
    {
        let anchor_slot = self.lookup(anchor)?;
        if Some(anchor_slot) == self.head {
            return self.add_first(name, handler);
        }

        let key = self.check_new_name(name, None)?;
        let prev = self.node(anchor_slot).and_then(|node| node.prev);
        self.splice(key, name, Arc::new(handler), prev, Some(anchor_slot))?;
        debug!(category = %self.category, node = name, anchor, "added before");
        Ok(self)
    }

    /// Insert a node directly after the node named `anchor`
    pub fn add_after<H>(&mut self, anchor: &str, name: &str, handler: H) -> Result<&mut Self>
    where
        H: EventHandler<E> + 'static,
    {
        let anchor_slot = self.lookup(anchor)?;
        if Some(anchor_slot) == self.tail {
            return self.add_last(name, handler);
        }

        let key = self.check_new_name(name, None)?;
        let next = self.node(anchor_slot).and_then(|node| node.next);
        self.splice(key, name, Arc::new(handler), Some(anchor_slot), next)?;
        debug!(category = %self.category, node = name, anchor, "added after");
        Ok(self)
    }

    /// Case-insensitive lookup
    pub fn by_name(&self, name: &str) -> Option<&ChainNode<E>> {
        let slot = *self.index.get(&name_key(name))?;
        self.node(slot)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name_key(name))
    }

    /// Unlink the node named `name` and hand back its handler
    pub fn remove(&mut self, name: &str) -> Result<Handler<E>> {
        let slot = self.lookup(name)?;
        self.remove_slot(slot)
    }

    /// Unlink the node behind `id`
    ///
    /// Fails with [`ChainError::NotFound`] for handles of removed nodes or of
    /// nodes that belong to another chain.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Handler<E>> {
        let slot = self.resolve(id)?;
        self.remove_slot(slot)
    }

    pub fn remove_first(&mut self) -> Result<Handler<E>> {
        let slot = self.head.ok_or_else(|| self.empty())?;
        self.remove_slot(slot)
    }

    pub fn remove_last(&mut self) -> Result<Handler<E>> {
        let slot = self.tail.ok_or_else(|| self.empty())?;
        self.remove_slot(slot)
    }

    /// Swap the node named `old_name` for a new node at the same position
    ///
    /// `new_name` must not clash with any other node; reusing `old_name` is
    /// fine. Replacing the head or tail makes the new node the head or tail.
    /// Returns the handle of the new node.
    pub fn replace<H>(&mut self, old_name: &str, new_name: &str, handler: H) -> Result<NodeId>
    where
        H: EventHandler<E> + 'static,
    {
        let slot = self.lookup(old_name)?;
        self.replace_slot(slot, new_name, Arc::new(handler))
    }

    /// Swap the node behind `old` for a new node at the same position
    pub fn replace_node<H>(&mut self, old: NodeId, new_name: &str, handler: H) -> Result<NodeId>
    where
        H: EventHandler<E> + 'static,
    {
        let slot = self.resolve(old)?;
        self.replace_slot(slot, new_name, Arc::new(handler))
    }

    /// Handler of the head node
    pub fn first(&self) -> Result<&Handler<E>> {
        self.first_node()
            .map(ChainNode::handler)
            .ok_or_else(|| self.empty())
    }

    /// Handler of the tail node
    pub fn last(&self) -> Result<&Handler<E>> {
        self.last_node()
            .map(ChainNode::handler)
            .ok_or_else(|| self.empty())
    }

    pub fn first_node(&self) -> Option<&ChainNode<E>> {
        self.node(self.head?)
    }

    pub fn last_node(&self) -> Option<&ChainNode<E>> {
        self.node(self.tail?)
    }

    /// Node names in dispatch order
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|node| node.name.clone()).collect()
    }

    /// Nodes in dispatch order, head to tail
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            chain: self,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    fn empty(&self) -> ChainError {
        ChainError::EmptyChain {
            category: self.category.name(),
        }
    }

    fn check_new_name(&self, name: &str, replacing: Option<u32>) -> Result<String> {
        if name.is_empty() {
            return Err(ChainError::InvalidArgument(format!(
                "node name for {} cannot be empty",
                self.category
            )));
        }

        let key = name_key(name);
        match self.index.get(&key) {
            Some(&slot) if Some(slot) != replacing => Err(ChainError::InvalidArgument(format!(
                "node `{name}` already exists in chain for {}",
                self.category
            ))),
            _ => Ok(key),
        }
    }

    fn lookup(&self, name: &str) -> Result<u32> {
        self.index.get(&name_key(name)).copied().ok_or_else(|| {
            ChainError::NotFound(format!("node `{name}` in chain for {}", self.category))
        })
    }

    fn resolve(&self, id: NodeId) -> Result<u32> {
        let live = id.chain == self.id
            && self
                .slots
                .get(id.slot as usize)
                .is_some_and(|slot| slot.generation == id.generation && slot.node.is_some());

        if live {
            Ok(id.slot)
        } else {
            Err(ChainError::NotFound(format!(
                "node {id} in chain for {}",
                self.category
            )))
        }
    }

    fn node(&self, slot: u32) -> Option<&ChainNode<E>> {
        self.slots.get(slot as usize)?.node.as_ref()
    }

    fn node_mut(&mut self, slot: u32) -> Option<&mut ChainNode<E>> {
        self.slots.get_mut(slot as usize)?.node.as_mut()
    }

    /// Point `slot`'s forward link at `next`; `None` stands for the head pointer
    fn set_next(&mut self, slot: Option<u32>, next: Option<u32>) {
        match slot {
            Some(slot) => {
                if let Some(node) = self.node_mut(slot) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
    }

    /// Point `slot`'s back link at `prev`; `None` stands for the tail pointer
    fn set_prev(&mut self, slot: Option<u32>, prev: Option<u32>) {
        match slot {
            Some(slot) => {
                if let Some(node) = self.node_mut(slot) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn allocate(&mut self, name: &str, handler: Handler<E>) -> Result<NodeId> {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                let slot = u32::try_from(self.slots.len()).map_err(|_| {
                    ChainError::InvalidArgument(format!(
                        "chain for {} has no free node slots",
                        self.category
                    ))
                })?;
                self.slots.push(Slot {
                    generation: 0,
                    node: None,
                });
                slot
            }
        };

        let entry = &mut self.slots[slot as usize];
        let id = NodeId {
            chain: self.id,
            slot,
            generation: entry.generation,
        };
        entry.node = Some(ChainNode::new(id, name.to_string(), handler));
        Ok(id)
    }

    /// Empty `slot` and make it available again
    ///
    /// A slot whose generation is exhausted is retired instead, so no handle
    /// ever resolves twice.
    fn release(&mut self, slot: u32) -> Option<ChainNode<E>> {
        let entry = self.slots.get_mut(slot as usize)?;
        let node = entry.node.take()?;
        if let Some(generation) = entry.generation.checked_add(1) {
            entry.generation = generation;
            self.free.push(slot);
        }
        Some(node)
    }

    /// Link a new node between two neighbours that are adjacent right now
    fn splice(
        &mut self,
        key: String,
        name: &str,
        handler: Handler<E>,
        prev: Option<u32>,
        next: Option<u32>,
    ) -> Result<NodeId> {
        let id = self.allocate(name, handler)?;
        self.link(key, id.slot, prev, next);
        Ok(id)
    }

    fn link(&mut self, key: String, slot: u32, prev: Option<u32>, next: Option<u32>) {
        if let Some(node) = self.node_mut(slot) {
            node.prev = prev;
            node.next = next;
        }
        self.set_next(prev, Some(slot));
        self.set_prev(next, Some(slot));
        self.index.insert(key, slot);
    }

    fn unlink(&mut self, slot: u32) -> Option<ChainNode<E>> {
        let node = self.release(slot)?;
        self.set_next(node.prev, node.next);
        self.set_prev(node.next, node.prev);
        self.index.remove(&name_key(&node.name));
        Some(node)
    }

    fn remove_slot(&mut self, slot: u32) -> Result<Handler<E>> {
        let node = self.unlink(slot).ok_or_else(|| {
            ChainError::NotFound(format!("slot {slot} in chain for {}", self.category))
        })?;
        debug!(category = %self.category, node = %node.name, "removed");
        Ok(node.handler)
    }

    fn replace_slot(&mut self, slot: u32, new_name: &str, handler: Handler<E>) -> Result<NodeId> {
        let key = self.check_new_name(new_name, Some(slot))?;
        // Allocate first so a failure leaves the old node in place.
        let id = self.allocate(new_name, handler)?;
        let Some(old) = self.unlink(slot) else {
            self.release(id.slot);
            return Err(ChainError::NotFound(format!(
                "slot {slot} in chain for {}",
                self.category
            )));
        };

        // The unlinked node's neighbours are adjacent again; linking between
        // them restores the position, including head and tail pointers.
        self.link(key, id.slot, old.prev, old.next);
        debug!(category = %self.category, old = %old.name, new = new_name, "replaced");
        Ok(id)
    }
}

impl<E: Event> Default for HandlerChain<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for HandlerChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("category", &self.category.name())
            .field("cancellable", &self.is_cancellable())
            .field("nodes", &self.names())
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// Iterator over a chain's nodes, head to tail
pub struct Iter<'a, E> {
    chain: &'a HandlerChain<E>,
    cursor: Option<u32>,
    remaining: usize,
}

impl<'a, E: Event> Iterator for Iter<'a, E> {
    type Item = &'a ChainNode<E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.chain.node(self.cursor?)?;
        self.cursor = node.next;
        self.remaining -= 1;
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a, E: Event> IntoIterator for &'a HandlerChain<E> {
    type Item = &'a ChainNode<E>;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_handler::HandlerResult;

    #[derive(Default)]
    struct Trace {
        seen: Vec<&'static str>,
    }

    impl Event for Trace {}

    fn tag(label: &'static str) -> impl Fn(&mut Trace) -> HandlerResult + Send + Sync {
        move |event: &mut Trace| {
            event.seen.push(label);
            Ok(())
        }
    }

    fn call(handler: &Handler<Trace>) -> Vec<&'static str> {
        let mut event = Trace::default();
        handler.handle(&mut event).unwrap();
        event.seen
    }

    fn abc() -> HandlerChain<Trace> {
        let mut chain = HandlerChain::new();
        chain
            .add_first("A", tag("a"))
            .unwrap()
            .add_last("B", tag("b"))
            .unwrap()
            .add_last("C", tag("c"))
            .unwrap();
        chain
    }

    /// Walks the back links from the tail and checks they mirror the forward order.
    fn assert_links(chain: &HandlerChain<Trace>) {
        let forward = chain.names();
        let mut backward = Vec::new();
        let mut cursor = chain.tail;
        while let Some(slot) = cursor {
            let node = chain.node(slot).unwrap();
            backward.push(node.name.clone());
            cursor = node.prev;
        }
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), chain.len());
        assert_eq!(chain.first_node().and_then(|node| node.prev), None);
        assert_eq!(chain.last_node().and_then(|node| node.next), None);
    }

    #[test]
    fn positional_inserts() {
        let mut chain = abc();
        chain.add_before("B", "X", tag("x")).unwrap();
        assert_eq!(chain.names(), ["A", "X", "B", "C"]);

        chain.add_after("B", "Y", tag("y")).unwrap();
        assert_eq!(chain.names(), ["A", "X", "B", "Y", "C"]);

        chain.add_before("A", "H", tag("h")).unwrap();
        chain.add_after("C", "T", tag("t")).unwrap();
        assert_eq!(chain.names(), ["H", "A", "X", "B", "Y", "C", "T"]);
        assert_links(&chain);
    }

    #[test]
    fn add_after_links_back_to_the_anchor() {
        let mut chain = abc();
        chain.add_after("A", "X", tag("x")).unwrap();

        let x = chain.by_name("X").unwrap();
        assert_eq!(x.prev, chain.by_name("A").map(|node| node.id.slot));
        assert_eq!(x.next, chain.by_name("B").map(|node| node.id.slot));
        assert_links(&chain);
    }

    #[test]
    fn missing_anchor_is_not_found() {
        let mut chain = abc();
        assert!(chain.add_before("nope", "X", tag("x")).unwrap_err().is_not_found());
        assert!(chain.add_after("nope", "X", tag("x")).unwrap_err().is_not_found());
        assert_eq!(chain.names(), ["A", "B", "C"]);
    }

    #[test]
    fn duplicate_and_empty_names_are_rejected() {
        let mut chain = abc();
        assert!(chain.add_first("a", tag("x")).unwrap_err().is_invalid_argument());
        assert!(chain.add_last("B", tag("x")).unwrap_err().is_invalid_argument());
        assert!(chain.add_after("A", "c", tag("x")).unwrap_err().is_invalid_argument());
        assert!(chain.add_before("C", "", tag("x")).unwrap_err().is_invalid_argument());
        assert_eq!(chain.names(), ["A", "B", "C"]);
        assert_links(&chain);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let chain = abc();
        assert_eq!(chain.by_name("b").map(ChainNode::name), Some("B"));
        assert!(chain.contains("c"));
        assert!(chain.by_name("d").is_none());
    }

    #[test]
    fn remove_relinks_neighbours() {
        let mut chain = abc();
        let removed = chain.remove("b").unwrap();
        assert_eq!(call(&removed), ["b"]);
        assert_eq!(chain.names(), ["A", "C"]);
        assert_links(&chain);

        chain.remove("A").unwrap();
        assert_eq!(call(chain.first().unwrap()), ["c"]);
        chain.remove("C").unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        assert!(chain.remove("C").unwrap_err().is_not_found());
    }

    #[test]
    fn remove_then_re_add_the_same_name() {
        let mut chain = abc();
        chain.remove("B").unwrap();
        chain.add_after("A", "b", tag("b2")).unwrap();
        assert_eq!(chain.names(), ["A", "b", "C"]);
        assert_links(&chain);
    }

    #[test]
    fn remove_first_and_last() {
        let mut chain = abc();
        assert_eq!(call(&chain.remove_first().unwrap()), ["a"]);
        assert_eq!(call(&chain.remove_last().unwrap()), ["c"]);
        assert_eq!(chain.names(), ["B"]);
        assert_eq!(call(chain.first().unwrap()), ["b"]);
        assert_eq!(call(chain.last().unwrap()), ["b"]);
        chain.remove_last().unwrap();
        assert!(chain.is_empty());
    }

    #[test]
    fn empty_chain_guards() {
        let mut chain = HandlerChain::<Trace>::new();
        assert!(chain.first().unwrap_err().is_empty_chain());
        assert!(chain.last().unwrap_err().is_empty_chain());
        assert!(chain.remove_first().unwrap_err().is_empty_chain());
        assert!(chain.remove_last().unwrap_err().is_empty_chain());
        assert!(chain.first_node().is_none());
        assert!(chain.names().is_empty());
    }

    #[test]
    fn replacing_the_head_moves_the_head() {
        let mut chain = abc();
        chain.replace("A", "Z", tag("z")).unwrap();
        assert_eq!(chain.names(), ["Z", "B", "C"]);
        assert_eq!(call(chain.first().unwrap()), ["z"]);
        assert!(!chain.contains("A"));
        assert_links(&chain);
    }

    #[test]
    fn replacing_the_tail_and_middle() {
        let mut chain = abc();
        chain.replace("C", "Z", tag("z")).unwrap();
        chain.replace("B", "Y", tag("y")).unwrap();
        assert_eq!(chain.names(), ["A", "Y", "Z"]);
        assert_eq!(call(chain.last().unwrap()), ["z"]);
        assert_links(&chain);
    }

    #[test]
    fn replace_keeps_or_recases_the_name() {
        let mut chain = abc();
        chain.replace("B", "b", tag("b2")).unwrap();
        assert_eq!(chain.names(), ["A", "b", "C"]);
        assert!(chain.replace("b", "C", tag("x")).unwrap_err().is_invalid_argument());
        assert!(chain.replace("missing", "Q", tag("x")).unwrap_err().is_not_found());
        assert_eq!(chain.names(), ["A", "b", "C"]);
    }

    #[test]
    fn sole_node_replace() {
        let mut chain = HandlerChain::new();
        chain.add_first("only", tag("old")).unwrap();
        chain.replace("only", "new", tag("new")).unwrap();
        assert_eq!(chain.names(), ["new"]);
        assert_eq!(call(chain.first().unwrap()), ["new"]);
        assert_eq!(call(chain.last().unwrap()), ["new"]);
    }

    #[test]
    fn node_handles_go_stale() {
        let mut chain = abc();
        let b = chain.by_name("B").unwrap().id();
        let replacement = chain.replace_node(b, "B2", tag("b2")).unwrap();
        assert_ne!(b, replacement);
        assert!(chain.remove_node(b).unwrap_err().is_not_found());
        assert!(chain.replace_node(b, "B3", tag("b3")).unwrap_err().is_not_found());

        chain.remove_node(replacement).unwrap();
        assert_eq!(chain.names(), ["A", "C"]);
        assert!(chain.remove_node(replacement).unwrap_err().is_not_found());
    }

    #[test]
    fn foreign_handles_do_not_resolve() {
        let mut ours = abc();
        let theirs = abc();
        let foreign = theirs.by_name("A").unwrap().id();
        assert!(ours.remove_node(foreign).unwrap_err().is_not_found());
        assert_eq!(ours.names(), ["A", "B", "C"]);
    }

    #[test]
    fn names_fold_one_char_at_a_time() {
        let mut chain = HandlerChain::new();
        chain.add_last("İnform", tag("dotted")).unwrap();
        assert_eq!(chain.by_name("inform").map(ChainNode::name), Some("İnform"));
        assert!(chain.add_last("INFORM", tag("x")).unwrap_err().is_invalid_argument());

        chain.add_last("straße", tag("sharp")).unwrap();
        assert!(chain.by_name("STRASSE").is_none());
        assert!(chain.contains("STRAßE"));

        chain.add_last("σ", tag("sigma")).unwrap();
        assert!(chain.contains("ς"));
        assert!(chain.contains("Σ"));
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn exhausted_slots_are_retired() {
        let mut chain = abc();
        let b = chain.by_name("B").unwrap().id();
        chain.slots[b.slot as usize].generation = u32::MAX;
        let worn = NodeId {
            generation: u32::MAX,
            ..b
        };

        chain.remove_node(worn).unwrap();
        assert!(!chain.free.contains(&b.slot));

        let fresh = chain.add_last("D", tag("d")).unwrap().by_name("D").unwrap().id();
        assert_ne!(fresh.slot, b.slot);
        assert!(chain.remove_node(worn).unwrap_err().is_not_found());
        assert_eq!(chain.names(), ["A", "C", "D"]);
        assert_links(&chain);
    }

    #[test]
    fn names_is_a_snapshot() {
        let mut chain = abc();
        let before = chain.names();
        chain.remove("A").unwrap();
        assert_eq!(before, ["A", "B", "C"]);
    }

    #[test]
    fn iteration_follows_dispatch_order() {
        let mut chain = abc();
        chain.add_first("Z", tag("z")).unwrap();
        let names: Vec<&str> = (&chain).into_iter().map(ChainNode::name).collect();
        assert_eq!(names, ["Z", "A", "B", "C"]);
        assert_eq!(chain.iter().count(), chain.len());
    }
}
