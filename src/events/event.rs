use std::any::{Any, TypeId};
use std::fmt;

/// Type-erasure helpers every [`Event`] gets for free
///
/// Hosts deliver events as `&mut dyn Event`; chains use this to recover the
/// concrete type and to name it when it turns out to be the wrong one.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn event_type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn event_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// An event that can be dispatched through a handler chain
///
/// The trait stays object safe so a host can hand events around as
/// `&mut dyn Event`. The per-category hooks are `Self: Sized` functions and
/// are only consulted when a chain for the concrete type is built.
///
/// # Example
///
/// ```ignore
/// struct PlayerJoin {
///     join_message: Option<String>,
/// }
///
/// impl Event for PlayerJoin {}
///
/// struct CommandPreprocess {
///     message: String,
///     cancelled: bool,
/// }
///
/// impl Cancellable for CommandPreprocess {
///     fn is_cancelled(&self) -> bool { self.cancelled }
///     fn set_cancelled(&mut self, cancelled: bool) { self.cancelled = cancelled; }
/// }
///
/// impl Event for CommandPreprocess {
///     fn suppression() -> Option<Suppression<Self>> {
///         Suppression::cancellable()
///     }
/// }
/// ```
pub trait Event: AsAny + Send {
    /// Identifier the registry keys this category by
    ///
    /// Defaults to the Rust type name. Two event types reporting the same name
    /// cannot both be registered.
    fn category_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }

    /// Suppression accessors, present only for cancellable categories
    fn suppression() -> Option<Suppression<Self>>
    where
        Self: Sized,
    {
        None
    }
}

/// Events whose dispatch can be halted by a handler
///
/// Implementing this trait alone does not make a chain stop early: the
/// category's [`Event::suppression`] must return
/// [`Suppression::cancellable`]. [`cancellable_event!`](crate::cancellable_event)
/// writes that `Event` impl.
pub trait Cancellable {
    fn is_cancelled(&self) -> bool;
    fn set_cancelled(&mut self, cancelled: bool);
}

/// Implement [`Event`] for a [`Cancellable`] type with suppression wired to
/// its cancelled flag
///
/// ```ignore
/// impl Cancellable for CommandPreprocess { /* ... */ }
///
/// cancellable_event!(CommandPreprocess);
/// cancellable_event!(ChatMessage, "chat");
/// ```
#[macro_export]
macro_rules! cancellable_event {
    ($event:ty) => {
        impl $crate::Event for $event {
            fn suppression() -> Option<$crate::Suppression<Self>> {
                $crate::Suppression::cancellable()
            }
        }
    };
    ($event:ty, $name:expr) => {
        impl $crate::Event for $event {
            fn category_name() -> &'static str {
                $name
            }

            fn suppression() -> Option<$crate::Suppression<Self>> {
                $crate::Suppression::cancellable()
            }
        }
    };
}

/// Read/write access to an event's suppression flag
pub struct Suppression<E> {
    is_suppressed: fn(&E) -> bool,
    set_suppressed: fn(&mut E, bool),
}

impl<E> Suppression<E> {
    pub fn new(is_suppressed: fn(&E) -> bool, set_suppressed: fn(&mut E, bool)) -> Self {
        Self {
            is_suppressed,
            set_suppressed,
        }
    }

    pub fn is_suppressed(&self, event: &E) -> bool {
        (self.is_suppressed)(event)
    }

    pub fn set_suppressed(&self, event: &mut E, suppressed: bool) {
        (self.set_suppressed)(event, suppressed)
    }
}

impl<E: Cancellable> Suppression<E> {
    /// Suppression backed by the event's [`Cancellable`] implementation
    pub fn cancellable() -> Option<Self> {
        Some(Self::new(E::is_cancelled, E::set_cancelled))
    }
}

// Manual impls: fn pointers are Copy regardless of `E`.
impl<E> Clone for Suppression<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Suppression<E> {}

impl<E> fmt::Debug for Suppression<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suppression").finish_non_exhaustive()
    }
}

/// Identity of an event category
///
/// Equality compares both the type identity and the registry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Category {
    id: TypeId,
    name: &'static str,
    type_name: &'static str,
}

impl Category {
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: E::category_name(),
            type_name: std::any::type_name::<E>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rust type backing this category
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether `event` is an instance of this category
    pub fn matches(&self, event: &dyn Event) -> bool {
        event.as_any().type_id() == self.id
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
