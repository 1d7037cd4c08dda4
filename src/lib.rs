//! Cooperative control-flow primitives for single-threaded async code.
//!
//! `turnwise` provides small building blocks for programs that funnel all
//! their work through one cooperative executor and coordinate it with
//! callbacks: event dispatch, trailing-edge debouncing, strictly sequential
//! iteration, chained task lists, and latest-request-wins cancellation.
//!
//! The crate is designed to work independently of any specific async runtime,
//! making it flexible and adaptable to various execution environments.
//! Its futures are ordinary `Future` values to spawn or await wherever the
//! host program runs, and its state lives in `Rc` cells rather than behind
//! locks, so everything stays on the one thread it was created on.
//!
//! Features include:
//! - An `EventDispatcher` for synchronous, name-keyed event handling
//! - A `debounce` wrapper that collapses a burst of calls into one delivery
//!   carrying the latest value
//! - An `AsyncEach` future that runs a task over a collection one element per
//!   turn, strictly in order, with an abort handle
//! - A `TaskChain` whose steps explicitly hand control to their successor,
//!   threading errors and options down the chain as plain data
//! - A `LatestWins` wrapper that aborts an in-flight operation the moment a
//!   newer request starts
//! - A resettable `Sleep` future backing the time-based pieces
//!
//! The components compose: any of the crate's abortable handles can stand in
//! wherever an `Abortable` operation is expected.

pub mod chain;
pub mod debounce;
pub mod dispatch;
pub mod each;
pub mod latest;
pub mod timing;

pub use chain::{Next, TaskChain};
pub use debounce::{Debounce, DebounceClosed, DebounceHandle, debounce};
pub use dispatch::EventDispatcher;
pub use each::{AsyncEach, EachHandle};
pub use latest::{Abortable, FlightHandle, LatestWins, Request};
