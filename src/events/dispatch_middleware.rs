use crate::events::event::Category;
use crate::events::event_handler::HandlerResult;

/// The handler invocation a middleware is wrapping
#[derive(Debug, Clone, Copy)]
pub struct HandlerCall<'a> {
    pub category: &'a Category,
    pub node: &'a str,
}

/// Middleware that wraps every handler invocation of a chain
///
/// Middleware runs in LIFO order: the last one added to a chain is the
/// outermost layer. Calling `next` runs the inner layers and finally the
/// handler itself. Returning an error without calling `next` vetoes the
/// handler and aborts the dispatch pass.
pub trait DispatchMiddleware: Send + Sync {
    fn handle(
        &self,
        call: &HandlerCall<'_>,
        next: &mut dyn FnMut() -> HandlerResult,
    ) -> HandlerResult;
}
