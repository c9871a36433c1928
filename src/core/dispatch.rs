use tracing::{debug, trace};

use crate::core::chain_error::{ChainError, Result};
use crate::core::chain_node::ChainNode;
use crate::core::dispatch_outcome::DispatchOutcome;
use crate::core::handler_chain::HandlerChain;
use crate::events::dispatch_middleware::HandlerCall;
use crate::events::event::Event;
use crate::events::event_handler::HandlerResult;

impl<E: Event> HandlerChain<E> {
    /// Dispatch `event` through the chain, head to tail
    ///
    /// # Suppression
    ///
    /// * **Cancellable categories**: after every handler the event's
    ///   suppression flag is checked and the pass stops as soon as it is set
    /// * **Other categories**: every handler runs exactly once
    ///
    /// # Failures
    ///
    /// A failing handler (or middleware) aborts the pass immediately with
    /// [`ChainError::Handler`]. Handlers that already ran are not rolled back.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut event = CommandPreprocess::new("/plugin:reload");
    /// let outcome = chain.dispatch(&mut event)?;
    ///
    /// match outcome.status {
    ///     DispatchStatus::Completed => println!("all {} handlers ran", outcome.invoked),
    ///     DispatchStatus::Suppressed => println!("stopped by {:?}", outcome.suppressed_by),
    /// }
    /// ```
    pub fn dispatch(&self, event: &mut E) -> Result<DispatchOutcome> {
        match self.suppression {
            Some(suppression) => {
                self.walk(event, Some(&|event: &E| suppression.is_suppressed(event)))
            }
            None => self.walk(event, None),
        }
    }

    /// Dispatch with an explicit suppression predicate
    ///
    /// The predicate is checked after every handler regardless of whether the
    /// category itself is cancellable.
    pub fn dispatch_with<F>(&self, event: &mut E, is_suppressed: F) -> Result<DispatchOutcome>
    where
        F: Fn(&E) -> bool,
    {
        self.walk(event, Some(&is_suppressed))
    }

    fn walk(
        &self,
        event: &mut E,
        is_suppressed: Option<&dyn Fn(&E) -> bool>,
    ) -> Result<DispatchOutcome> {
        let mut invoked = 0;

        for node in self.iter() {
            trace!(category = %self.category(), node = %node.name, "invoking handler");
            self.invoke(0, node, event)
                .map_err(|source| ChainError::Handler {
                    node: node.name.clone(),
                    source,
                })?;
            invoked += 1;

            if is_suppressed.is_some_and(|suppressed| suppressed(&*event)) {
                debug!(category = %self.category(), node = %node.name, invoked, "dispatch suppressed");
                return Ok(DispatchOutcome::suppressed(invoked, node.name.clone()));
            }
        }

        Ok(DispatchOutcome::completed(invoked))
    }

    /// Run one handler inside the middleware stack (LIFO - last added runs first)
    fn invoke(&self, depth: usize, node: &ChainNode<E>, event: &mut E) -> HandlerResult {
        let Some(index) = self.middlewares.len().checked_sub(depth + 1) else {
            return node.handler.handle(event);
        };

        let call = HandlerCall {
            category: self.category(),
            node: &node.name,
        };
        let mut next = || self.invoke(depth + 1, node, event);

        self.middlewares[index].handle(&call, &mut next)
    }
}
