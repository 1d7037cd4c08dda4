//! Latest-request-wins wrapping for abortable operations.
//!
//! A [`LatestWins`] wraps a factory that launches asynchronous operations and
//! enforces that at most one launched operation is outstanding: starting a new
//! request first aborts the in-flight operation and runs the abort callback
//! its request registered. A superseded operation is finished for good; even
//! if it reports a completion later, that completion is discarded.

use std::{cell::RefCell, marker::PhantomData, rc::Rc};

use tracing::{debug, trace};

/// Cancellation interface for in-flight operations.
///
/// [`LatestWins`] requires the handle returned by its factory to implement
/// this trait so a superseded operation can be stopped. The crate's own
/// handles implement it, so its primitives can be wrapped directly.
pub trait Abortable {
    /// Stops the underlying operation.
    fn abort(&mut self);
}

/// The callbacks accompanying one request through a [`LatestWins`].
///
/// Carries the success callback that receives the operation's result and,
/// optionally, an abort callback that runs if the operation is aborted before
/// it succeeds. The operation side reports its result through
/// [`complete`](Request::complete).
pub struct Request<T: 'static> {
    on_success: Box<dyn FnOnce(T)>,
    on_abort: Option<Box<dyn FnOnce()>>,
}

impl<T: 'static> Request<T> {
    /// Creates a request whose result is handed to `on_success`.
    pub fn new(on_success: impl FnOnce(T) + 'static) -> Self {
        Request {
            on_success: Box::new(on_success),
            on_abort: None,
        }
    }

    /// Registers a callback that runs if the operation is aborted, whether by
    /// a superseding request or by [`FlightHandle::abort`]. It never runs for
    /// an operation that has succeeded.
    #[must_use]
    pub fn on_abort(mut self, cb: impl FnOnce() + 'static) -> Self {
        self.on_abort = Some(Box::new(cb));
        self
    }

    /// Reports the operation's result, consuming the request.
    ///
    /// This is the operation side of the contract: whatever work the factory
    /// launched calls `complete` exactly once when it is done.
    pub fn complete(self, value: T) {
        (self.on_success)(value);
    }
}

impl<T: 'static> Default for Request<T> {
    /// A request that ignores its result.
    fn default() -> Self {
        Request::new(|_| {})
    }
}

struct InFlight<H> {
    handle: H,
    on_abort: Option<Box<dyn FnOnce()>>,
}

impl<H: Abortable> InFlight<H> {
    // Abort order: stop the operation first, then notify its owner.
    fn abort(mut self) {
        self.handle.abort();
        if let Some(cb) = self.on_abort.take() {
            cb();
        }
    }
}

// Every state transition funnels through these methods. `epoch` identifies
// the most recent request, `settled` means that request's operation already
// succeeded, and `current` is occupied only while an unsettled operation is
// tracked.
struct Slot<H> {
    current: Option<InFlight<H>>,
    epoch: u64,
    settled: bool,
}

impl<H> Slot<H> {
    fn new() -> Self {
        Slot {
            current: None,
            epoch: 0,
            settled: true,
        }
    }

    // Takes whatever is tracked so the caller can abort it outside the borrow.
    fn preempt(&mut self) -> Option<InFlight<H>> {
        self.current.take()
    }

    // Claims a fresh epoch for a request about to launch.
    fn reserve(&mut self) -> u64 {
        self.epoch += 1;
        self.settled = false;
        self.epoch
    }

    // Marks `epoch`'s operation as succeeded and untracks it. Returns whether
    // that epoch was still the live one; a stale settle changes nothing.
    fn settle(&mut self, epoch: u64) -> bool {
        if epoch == self.epoch && !self.settled {
            self.settled = true;
            self.current = None;
            true
        } else {
            false
        }
    }

    // Starts tracking `epoch`'s operation. An operation that settled during
    // its own launch is over and must not be tracked, or a later request
    // would abort a handle whose work already finished.
    fn begin(&mut self, epoch: u64, flight: InFlight<H>) {
        if epoch == self.epoch && !self.settled {
            self.current = Some(flight);
        }
    }

    // Takes `epoch`'s operation for an explicit abort; `None` when that epoch
    // has settled, been superseded, or already been aborted.
    fn release(&mut self, epoch: u64) -> Option<InFlight<H>> {
        if epoch == self.epoch && !self.settled {
            self.current.take()
        } else {
            None
        }
    }
}

/// Wraps an operation factory so that at most one launched operation is
/// outstanding at a time.
///
/// Starting a request while a previous operation is in flight aborts that
/// operation through its [`Abortable`] handle and then runs the abort
/// callback its request registered, both before the new operation launches.
/// When an operation completes, the wrapper forgets it first and then runs
/// its success callback, so the callback may immediately start a follow-up
/// request without aborting anything.
///
/// # Example
/// ```
/// use std::{cell::Cell, rc::Rc};
/// use turnwise::{Abortable, LatestWins, Request};
///
/// struct Stop;
/// impl Abortable for Stop {
///     fn abort(&mut self) {}
/// }
///
/// // A real factory would launch work that completes later; this one
/// // completes on the spot.
/// let mut fetch = LatestWins::new(|request: Request<u32>| {
///     request.complete(7);
///     Stop
/// });
///
/// let got = Rc::new(Cell::new(0));
/// let got_cl = Rc::clone(&got);
/// fetch.start(Request::new(move |value| got_cl.set(value)));
/// assert_eq!(got.get(), 7);
/// ```
pub struct LatestWins<T: 'static, H, F> {
    factory: F,
    slot: Rc<RefCell<Slot<H>>>,
    _request: PhantomData<fn(Request<T>)>,
}

impl<T, H, F> LatestWins<T, H, F>
where
    T: 'static,
    H: Abortable + 'static,
    F: FnMut(Request<T>) -> H,
{
    /// Creates a wrapper around `factory`.
    ///
    /// The factory is invoked once per [`start`](LatestWins::start): it
    /// launches the operation for the request it receives and returns the
    /// handle that can abort that operation.
    pub fn new(factory: F) -> Self {
        LatestWins {
            factory,
            slot: Rc::new(RefCell::new(Slot::new())),
            _request: PhantomData,
        }
    }

    /// Launches the operation for `request`, aborting the in-flight
    /// operation first if there is one.
    ///
    /// Returns a [`FlightHandle`] that can abort the launched operation for
    /// as long as it is neither completed nor superseded. A completion
    /// reported by an operation this call superseded is discarded: its
    /// success callback will not run.
    pub fn start(&mut self, request: Request<T>) -> FlightHandle<H> {
        let preempted = self.slot.borrow_mut().preempt();
        if let Some(flight) = preempted {
            debug!("superseding in-flight operation");
            flight.abort();
        }

        let epoch = self.slot.borrow_mut().reserve();
        let Request {
            on_success,
            on_abort,
        } = request;
        let slot = Rc::clone(&self.slot);
        let wrapped = Request::new(move |value: T| {
            // Untrack before running the callback, and drop the completion
            // entirely if a newer request has taken over in the meantime.
            if slot.borrow_mut().settle(epoch) {
                on_success(value);
            } else {
                trace!(epoch, "stale completion discarded");
            }
        });

        let handle = (self.factory)(wrapped);
        self.slot
            .borrow_mut()
            .begin(epoch, InFlight { handle, on_abort });
        FlightHandle {
            slot: Rc::clone(&self.slot),
            epoch,
        }
    }
}

/// A handle for aborting the operation launched by one particular
/// [`start`](LatestWins::start).
///
/// Aborting stops the operation through its own handle and then runs the
/// abort callback its request registered. The handle only ever affects its
/// own operation: once that operation has completed or been superseded the
/// handle is inert, and aborting twice does nothing the second time.
pub struct FlightHandle<H> {
    slot: Rc<RefCell<Slot<H>>>,
    epoch: u64,
}

impl<H: Abortable> FlightHandle<H> {
    /// Aborts the operation this handle was returned for, if it is still the
    /// one in flight.
    pub fn abort(&self) {
        let flight = self.slot.borrow_mut().release(self.epoch);
        if let Some(flight) = flight {
            trace!(epoch = self.epoch, "operation aborted");
            flight.abort();
        }
    }
}

impl<H: Abortable> Abortable for FlightHandle<H> {
    fn abort(&mut self) {
        FlightHandle::abort(self);
    }
}

impl<H> Clone for FlightHandle<H> {
    fn clone(&self) -> Self {
        FlightHandle {
            slot: Rc::clone(&self.slot),
            epoch: self.epoch,
        }
    }
}
