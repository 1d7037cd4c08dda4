//! Strictly sequential iteration, one element per scheduler turn.
//!
//! An [`AsyncEach`] runs a task over each element of a collection, but never
//! more than one element per poll: after each element it wakes itself and
//! yields, so every other task on the executor gets a turn in between. The
//! run can be stopped early through its [`EachHandle`].

use std::{cell::Cell, rc::Rc};

use pin_project_lite::pin_project;
use tracing::trace;

use crate::Abortable;

pin_project! {
    /// A future that applies a task to each element of a collection, one
    /// element per turn, strictly in order.
    ///
    /// Created together with its abort handle by [`AsyncEach::new`]. The
    /// element task receives the element and its zero-based index. After the
    /// last element has been processed one further turn elapses, then the
    /// completion callback (if one was set) runs and the future resolves.
    ///
    /// # Example
    /// ```
    /// use std::{cell::RefCell, rc::Rc};
    /// use futures::executor::LocalPool;
    /// use turnwise::AsyncEach;
    ///
    /// let seen = Rc::new(RefCell::new(Vec::new()));
    /// let seen_cl = Rc::clone(&seen);
    ///
    /// let (mut each, _handle) = AsyncEach::new(["a", "b", "c"], move |item, index| {
    ///     seen_cl.borrow_mut().push((index, item));
    /// });
    /// each.on_complete(|| println!("all done"));
    ///
    /// LocalPool::new().run_until(each);
    /// assert_eq!(*seen.borrow(), [(0, "a"), (1, "b"), (2, "c")]);
    /// ```
    #[must_use = "futures do nothing unless polled or .awaited"]
    pub struct AsyncEach<I, F> {
        items: I,
        task: F,
        index: usize,
        aborted: Rc<Cell<bool>>,
        cb: Option<Box<dyn FnOnce()>>,
    }
}

impl<I, F> AsyncEach<I, F>
where
    I: Iterator,
    F: FnMut(I::Item, usize),
{
    /// Creates a sequential run over `items` together with the [`EachHandle`]
    /// that can abort it.
    pub fn new<It>(items: It, task: F) -> (Self, EachHandle)
    where
        It: IntoIterator<IntoIter = I>,
    {
        let aborted = Rc::new(Cell::new(false));
        let each = AsyncEach {
            items: items.into_iter(),
            task,
            index: 0,
            aborted: Rc::clone(&aborted),
            cb: None,
        };
        (each, EachHandle { aborted })
    }

    /// Sets the callback that runs once after the final element's turn.
    ///
    /// The callback is skipped entirely if the run is aborted, even when the
    /// abort arrives after the last element has already been processed. An
    /// empty collection runs the callback on the first poll.
    pub fn on_complete(&mut self, cb: impl FnOnce() + 'static) -> &mut Self {
        self.cb = Some(Box::new(cb));
        self
    }
}

impl<I, F> Future for AsyncEach<I, F>
where
    I: Iterator,
    F: FnMut(I::Item, usize),
{
    type Output = ();

    fn poll(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        let this = self.project();
        // Abort is observed at turn boundaries, so an element task that
        // aborts its own run still finishes its element.
        if this.aborted.get() {
            trace!(index = *this.index, "sequential run aborted");
            return std::task::Poll::Ready(());
        }
        match this.items.next() {
            Some(item) => {
                (this.task)(item, *this.index);
                *this.index += 1;
                cx.waker().wake_by_ref();
                std::task::Poll::Pending
            }
            None => {
                if let Some(cb) = this.cb.take() {
                    cb();
                }
                std::task::Poll::Ready(())
            }
        }
    }
}

/// A handle for stopping a running [`AsyncEach`].
///
/// Aborting stops the run at the next turn boundary: elements not yet started
/// never run and the completion callback is suppressed. Aborting is idempotent
/// and has no effect on a run that has already completed. Clones share the
/// same run.
#[derive(Clone)]
pub struct EachHandle {
    aborted: Rc<Cell<bool>>,
}

impl EachHandle {
    /// Stops the run at the next turn boundary and suppresses its completion
    /// callback.
    pub fn abort(&self) {
        self.aborted.set(true);
    }

    /// Returns `true` if the run has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.aborted.get()
    }
}

impl Abortable for EachHandle {
    fn abort(&mut self) {
        EachHandle::abort(self);
    }
}
