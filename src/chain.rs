//! Ordered task lists with explicit continuations.
//!
//! A [`TaskChain`] holds a list of steps that run strictly one after another.
//! Nothing advances the chain except a step handing control onward through
//! the [`Next`] continuation it receives, which is what lets a step finish
//! its work in a later turn before its successor starts. Steps pass an
//! optional error value and an optional options value down the chain; both
//! travel as plain data that the chain itself never inspects.

use std::{cell::RefCell, rc::Rc};

use tracing::trace;

type Step<E, O> = Box<dyn FnOnce(Option<E>, Next<E, O>, Option<O>)>;

struct ChainState<E: 'static, O: 'static> {
    steps: Vec<Option<Step<E, O>>>,
    cursor: usize,
}

/// A list of steps executed strictly in order, each deciding when and
/// whether its successor runs.
///
/// Every step receives the error value forwarded by its predecessor, a
/// [`Next`] continuation, and the options value forwarded by its
/// predecessor. Invoking the continuation runs the following step; dropping
/// it without invoking stalls the chain permanently, which is a legitimate
/// way to stop. Running past the final step completes the chain silently.
///
/// Clones share the same step list and cursor, so a clone captured by a step
/// can append further steps while the chain is running; steps appended ahead
/// of the cursor still run. Steps are consumed as they execute. Appending
/// after the chain has completed, or calling [`start`](TaskChain::start) a
/// second time, is not meaningful: execution simply ends at the first
/// already-consumed slot.
///
/// # Example
/// ```
/// use turnwise::TaskChain;
///
/// let chain: TaskChain<String, u32> = TaskChain::new();
/// chain
///     .add_task(|_, next, _| {
///         next.proceed(None, Some(1));
///     })
///     .add_task(|error, _next, options| {
///         assert!(error.is_none());
///         assert_eq!(options, Some(1));
///     });
/// chain.start();
/// ```
pub struct TaskChain<E: 'static, O: 'static> {
    state: Rc<RefCell<ChainState<E, O>>>,
}

impl<E: 'static, O: 'static> TaskChain<E, O> {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        TaskChain {
            state: Rc::new(RefCell::new(ChainState {
                steps: Vec::with_capacity(4),
                cursor: 0,
            })),
        }
    }

    /// Appends a step to the chain. Returns `&self` so additions can be
    /// chained.
    ///
    /// A step runs with the error and options values its predecessor
    /// forwarded (`None` and `None` for the first step) and the continuation
    /// that hands control to its successor.
    pub fn add_task(&self, step: impl FnOnce(Option<E>, Next<E, O>, Option<O>) + 'static) -> &Self {
        self.state.borrow_mut().steps.push(Some(Box::new(step)));
        self
    }

    /// Starts the chain by running the first step with no error and no
    /// options.
    ///
    /// Starting an empty chain completes it immediately.
    pub fn start(&self) {
        self.state.borrow_mut().cursor = 0;
        execute(&self.state, 0, None, None);
    }
}

impl<E: 'static, O: 'static> Default for TaskChain<E, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static, O: 'static> Clone for TaskChain<E, O> {
    fn clone(&self) -> Self {
        TaskChain {
            state: Rc::clone(&self.state),
        }
    }
}

/// The continuation a step uses to hand control to its successor.
///
/// `Next` is consumed by [`proceed`](Next::proceed), so a step can advance
/// the chain at most once. It is an ordinary owned value: a step may move it
/// into a closure or a spawned future and invoke it from a later turn, which
/// is what makes steps asynchronous. Dropping it unused stalls the chain.
pub struct Next<E: 'static, O: 'static> {
    state: Rc<RefCell<ChainState<E, O>>>,
}

impl<E: 'static, O: 'static> Next<E, O> {
    /// Advances the cursor and runs the next step with `error` and `options`.
    ///
    /// The chain never interprets `error`: forwarding `Some` is how a step
    /// reports failure to its successor, and forwarding `None` after
    /// receiving `Some` is how a step recovers. Past the final step this
    /// completes the chain silently.
    pub fn proceed(self, error: Option<E>, options: Option<O>) {
        let index = {
            let mut state = self.state.borrow_mut();
            state.cursor += 1;
            state.cursor
        };
        execute(&self.state, index, error, options);
    }
}

// Steps are taken out of their slot before running so the chain state is
// never borrowed while user code executes.
fn execute<E: 'static, O: 'static>(
    state: &Rc<RefCell<ChainState<E, O>>>,
    index: usize,
    error: Option<E>,
    options: Option<O>,
) {
    let step = {
        let mut st = state.borrow_mut();
        st.steps.get_mut(index).and_then(Option::take)
    };
    match step {
        Some(step) => {
            trace!(index, "running chain step");
            let next = Next {
                state: Rc::clone(state),
            };
            step(error, next, options);
        }
        None => trace!(index, "chain complete"),
    }
}
