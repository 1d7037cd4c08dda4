//! Trailing-edge debouncing for burst-prone callbacks.
//!
//! [`debounce`] splits a callback into a driver future and a cloneable
//! trigger handle. Calls through the handle do not run the callback; they
//! only (re)start a quiet period. The driver runs the callback with the most
//! recent call's value once a full quiet period passes with no further call,
//! so a burst of calls collapses into one delivery carrying the last value.

use std::{
    cell::RefCell,
    fmt,
    pin::Pin,
    rc::Rc,
    task::Waker,
    time::{Duration, Instant},
};

use pin_project_lite::pin_project;
use tracing::trace;

use crate::timing::Sleep;

struct Shared<T> {
    // The value to deliver and the instant its quiet period ends. Every call
    // replaces both.
    pending: Option<(Instant, T)>,
    quiet: Duration,
    waker: Option<Waker>,
    handles: usize,
    driver_gone: bool,
}

enum Step<T> {
    Deliver(T),
    Wait(Instant),
    Finish,
    Idle,
}

/// Creates a debounced version of `func` with the given quiet period.
///
/// Returns the driver future and the trigger handle. The driver must be run
/// on an executor (spawned, or awaited directly); it performs every delivery,
/// so the callback never runs inside [`DebounceHandle::call`], not even with
/// a zero quiet period. The driver resolves once every handle has been
/// dropped and the last pending delivery, if any, has been flushed. Dropping
/// the driver instead discards any pending delivery.
///
/// # Example
/// ```
/// use std::{cell::RefCell, rc::Rc, time::Duration};
/// use futures::executor::LocalPool;
/// use turnwise::debounce;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let seen_cl = Rc::clone(&seen);
///
/// let (driver, handle) =
///     debounce(move |v: u32| seen_cl.borrow_mut().push(v), Duration::from_millis(20));
///
/// handle.call(1).unwrap();
/// handle.call(2).unwrap(); // arrives within the quiet period, replaces 1
/// drop(handle);
///
/// LocalPool::new().run_until(driver);
/// assert_eq!(*seen.borrow(), [2]);
/// ```
#[must_use]
pub fn debounce<T, F>(func: F, quiet: Duration) -> (Debounce<T, F>, DebounceHandle<T>)
where
    F: FnMut(T),
{
    let shared = Rc::new(RefCell::new(Shared {
        pending: None,
        quiet,
        waker: None,
        handles: 1,
        driver_gone: false,
    }));
    let handle = DebounceHandle {
        shared: Rc::clone(&shared),
    };
    let driver = Debounce {
        shared,
        func,
        sleep: Sleep::new(quiet),
    };
    (driver, handle)
}

pin_project! {
    /// The future that owns a debounced callback and performs its deliveries.
    ///
    /// Created by [`debounce`]. Resolves once every [`DebounceHandle`] has
    /// been dropped and nothing is left to deliver.
    #[must_use = "futures do nothing unless polled or .awaited"]
    pub struct Debounce<T, F> {
        shared: Rc<RefCell<Shared<T>>>,
        func: F,
        #[pin]
        sleep: Sleep,
    }

    impl<T, F> PinnedDrop for Debounce<T, F> {
        fn drop(this: Pin<&mut Self>) {
            this.project().shared.borrow_mut().driver_gone = true;
        }
    }
}

impl<T, F> Future for Debounce<T, F>
where
    F: FnMut(T),
{
    type Output = ();

    fn poll(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        let mut this = self.project();
        loop {
            let step = {
                let mut shared = this.shared.borrow_mut();
                shared.waker = Some(cx.waker().clone());
                match shared.pending.take() {
                    Some((due, value)) if Instant::now() >= due => Step::Deliver(value),
                    Some(pending) => {
                        let due = pending.0;
                        shared.pending = Some(pending);
                        Step::Wait(due)
                    }
                    None if shared.handles == 0 => Step::Finish,
                    None => Step::Idle,
                }
            };
            match step {
                Step::Deliver(value) => {
                    trace!("quiet period elapsed, delivering");
                    // The callback runs outside the borrow, so it may call
                    // through a handle and re-arm; the loop picks that up.
                    (this.func)(value);
                }
                Step::Wait(due) => {
                    this.sleep.as_mut().reset_at(due);
                    if this.sleep.as_mut().poll(cx).is_pending() {
                        return std::task::Poll::Pending;
                    }
                }
                Step::Finish => return std::task::Poll::Ready(()),
                Step::Idle => return std::task::Poll::Pending,
            }
        }
    }
}

/// The trigger side of a debounced callback.
///
/// Each [`call`](DebounceHandle::call) stores its value as the pending
/// delivery, replacing the previous one, and restarts the quiet period.
/// Clones share the same debounced callback; the driver keeps running until
/// the last of them is gone.
pub struct DebounceHandle<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

impl<T> DebounceHandle<T> {
    /// Schedules `value` for delivery once a full quiet period passes with
    /// no further call.
    ///
    /// Only the most recent value is ever delivered; earlier undelivered
    /// values are dropped on the spot. Delivery happens on the driver, a
    /// turn boundary away at the soonest.
    ///
    /// # Errors
    ///
    /// Returns the value back in [`DebounceClosed`] if the driver future has
    /// been dropped, since nothing could deliver it anymore.
    pub fn call(&self, value: T) -> Result<(), DebounceClosed<T>> {
        let mut shared = self.shared.borrow_mut();
        if shared.driver_gone {
            return Err(DebounceClosed(value));
        }
        let due = Instant::now() + shared.quiet;
        shared.pending = Some((due, value));
        if let Some(waker) = shared.waker.take() {
            waker.wake();
        }
        Ok(())
    }
}

impl<T> Clone for DebounceHandle<T> {
    fn clone(&self) -> Self {
        self.shared.borrow_mut().handles += 1;
        DebounceHandle {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T> Drop for DebounceHandle<T> {
    fn drop(&mut self) {
        let mut shared = self.shared.borrow_mut();
        shared.handles -= 1;
        if shared.handles == 0 {
            // Wake the driver so it can flush and finish.
            if let Some(waker) = shared.waker.take() {
                waker.wake();
            }
        }
    }
}

/// Error returned by [`DebounceHandle::call`] when the driver future is
/// gone. Hands the undeliverable value back to the caller.
pub struct DebounceClosed<T>(pub T);

impl<T> fmt::Debug for DebounceClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DebounceClosed(..)")
    }
}

impl<T> fmt::Display for DebounceClosed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "calling a debounced function whose driver is gone")
    }
}

impl<T> std::error::Error for DebounceClosed<T> {}
