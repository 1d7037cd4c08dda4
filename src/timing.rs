//! Timing support for the crate's deferred primitives.
//!
//! Provides [`Sleep`], a leaf future that resolves once a deadline has passed.
//! It is executor-agnostic: wake-ups are armed on an internal thread pool, so it
//! works under any executor, including single-threaded ones like
//! `futures::executor::LocalPool`.

use std::{
    sync::OnceLock,
    task::Waker,
    time::{Duration, Instant},
};

use futures::executor::{ThreadPool, ThreadPoolBuilder};

static THREAD_POOL: OnceLock<ThreadPool> = OnceLock::new();

// Each armed sleeper blocks one pool thread until its deadline, so the pool
// size caps how many timers can be armed at once.
fn timer_pool() -> &'static ThreadPool {
    THREAD_POOL.get_or_init(|| {
        ThreadPoolBuilder::new()
            .pool_size(4)
            .create()
            .expect("Thread pool creation failed")
    })
}

/// A future that resolves once its deadline has passed.
///
/// The countdown starts when the `Sleep` is created, not when it is first
/// polled. The deadline can be moved with [`reset`](Sleep::reset) or
/// [`reset_at`](Sleep::reset_at); a moved deadline takes effect the next time
/// the future is polled. Polling after a stale wake-up simply arms a new
/// wake-up, so moving the deadline in either direction is safe.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use turnwise::timing::Sleep;
///
/// futures::executor::block_on(async {
///     Sleep::new(Duration::from_millis(10)).await;
/// });
/// ```
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct Sleep {
    deadline: Instant,
    // Deadline and waker the in-flight sleeper thread will wake. A mismatch
    // with the current deadline or polling task means a new sleeper is needed.
    armed: Option<(Instant, Waker)>,
}

impl Sleep {
    /// Creates a `Sleep` that resolves once `timeout` has elapsed from now.
    pub fn new(timeout: Duration) -> Self {
        Sleep::until(Instant::now() + timeout)
    }

    /// Creates a `Sleep` that resolves once `deadline` has passed.
    pub fn until(deadline: Instant) -> Self {
        Sleep {
            deadline,
            armed: None,
        }
    }

    /// Returns the instant at which this `Sleep` is due to resolve.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Moves the deadline to `timeout` from now.
    ///
    /// Works on an elapsed `Sleep` as well, which makes the future reusable
    /// for repeated waits.
    pub fn reset(&mut self, timeout: Duration) {
        self.reset_at(Instant::now() + timeout);
    }

    /// Moves the deadline to `deadline`.
    ///
    /// Takes effect the next time the future is polled.
    pub fn reset_at(&mut self, deadline: Instant) {
        self.deadline = deadline;
    }

    fn arm(&mut self, cx: &mut std::task::Context<'_>) {
        let up_to_date = match &self.armed {
            Some((due, waker)) => *due == self.deadline && waker.will_wake(cx.waker()),
            None => false,
        };
        if up_to_date {
            return;
        }
        let due = self.deadline;
        let waker = cx.waker().clone();
        self.armed = Some((due, waker.clone()));
        timer_pool().spawn_ok(async move {
            std::thread::sleep(due.saturating_duration_since(Instant::now()));
            waker.wake();
        });
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        let this = self.get_mut();
        if Instant::now() >= this.deadline {
            this.armed = None;
            return std::task::Poll::Ready(());
        }
        this.arm(cx);
        std::task::Poll::Pending
    }
}
