//! Synchronous, name-keyed event dispatch.
//!
//! An [`EventDispatcher`] maps event names to lists of handlers and invokes
//! them in registration order when the event is fired. It is a plain value
//! meant to be embedded as a field wherever events are needed, and it uses
//! interior mutability so hosts can register and fire through `&self`.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use tracing::trace;

type Handler<P> = Rc<RefCell<dyn FnMut(&P)>>;

/// A registry of named events and their handlers.
///
/// Handlers for one event run synchronously, in the order they were
/// registered, every time that event is fired. Registering the same closure
/// twice runs it twice. Firing an event nobody listens to does nothing.
///
/// # Example
/// ```
/// use std::{cell::Cell, rc::Rc};
/// use turnwise::EventDispatcher;
///
/// let events: EventDispatcher<u32> = EventDispatcher::new();
/// let total = Rc::new(Cell::new(0));
/// let total_cl = Rc::clone(&total);
///
/// events
///     .on("add", move |n| total_cl.set(total_cl.get() + n))
///     .on("add", |n| println!("added {n}"));
///
/// events.fire("add", &2).fire("add", &3);
/// assert_eq!(total.get(), 5);
/// ```
pub struct EventDispatcher<P> {
    handlers: RefCell<HashMap<String, Vec<Handler<P>>>>,
}

impl<P> EventDispatcher<P> {
    /// Creates an empty `EventDispatcher`.
    #[must_use]
    pub fn new() -> Self {
        EventDispatcher {
            handlers: RefCell::new(HashMap::with_capacity(8)),
        }
    }

    /// Registers `handler` for `event`.
    ///
    /// Handlers accumulate; there is no way to remove one. Returns `&self` so
    /// registrations can be chained.
    pub fn on(&self, event: impl Into<String>, handler: impl FnMut(&P) + 'static) -> &Self {
        let handler: Handler<P> = Rc::new(RefCell::new(handler));
        self.handlers
            .borrow_mut()
            .entry(event.into())
            .or_default()
            .push(handler);
        self
    }

    /// Fires `event`, invoking every handler registered for it with `payload`,
    /// in registration order.
    ///
    /// Dispatch iterates a snapshot of the handler list, so a handler may
    /// register further handlers or fire other events; handlers added to
    /// `event` during the call run from the next `fire` on. A handler that
    /// panics unwinds out of `fire` and the remaining handlers for that call
    /// are skipped; the dispatcher itself stays usable. A handler that fires
    /// an event it is itself currently handling panics when dispatch reaches
    /// it again.
    pub fn fire(&self, event: &str, payload: &P) -> &Self {
        let snapshot: Vec<Handler<P>> = match self.handlers.borrow().get(event) {
            Some(list) => list.clone(),
            None => return self,
        };
        trace!(event, handlers = snapshot.len(), "dispatching");
        for handler in &snapshot {
            (handler.borrow_mut())(payload);
        }
        self
    }
}

impl<P> Default for EventDispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}
