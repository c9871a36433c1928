use std::error::Error;
use std::fmt;

/// Error a handler (or middleware) reports back through dispatch
pub type HandlerError = Box<dyn Error + Send + Sync>;

pub type HandlerResult = std::result::Result<(), HandlerError>;

/// A single step in a handler chain
///
/// Handlers may mutate the event's payload and its suppression flag. They
/// must not mutate the topology of the chain that is dispatching to them.
///
/// Closures of the shape `Fn(&mut E) -> HandlerResult` implement this trait
/// directly. Spell out the return type so the error type can be inferred:
///
/// ```ignore
/// chain.add_first("block_join_message", |event: &mut PlayerJoin| -> HandlerResult {
///     event.join_message = None;
///     Ok(())
/// })?;
/// ```
pub trait EventHandler<E>: Send + Sync {
    fn handle(&self, event: &mut E) -> HandlerResult;
}

impl<E, F> EventHandler<E> for F
where
    F: Fn(&mut E) -> HandlerResult + Send + Sync,
{
    fn handle(&self, event: &mut E) -> HandlerResult {
        self(event)
    }
}

impl<E> fmt::Debug for dyn EventHandler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("EventHandler")
    }
}
