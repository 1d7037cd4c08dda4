use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    time::{Duration, Instant},
};

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use turnwise::{debounce, timing::Sleep};

#[test]
fn burst_of_calls_collapses_to_the_latest_value() {
    let mut pool = LocalPool::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let seen_cl = Rc::clone(&seen);
    let quiet = Duration::from_millis(50);
    let (driver, handle) = debounce(move |v: u32| seen_cl.borrow_mut().push(v), quiet);

    let started = Instant::now();
    handle.call(1).unwrap();
    handle.call(2).unwrap();
    handle.call(3).unwrap();
    assert!(
        seen.borrow().is_empty(),
        "Nothing may be delivered on the leading edge"
    );

    drop(handle);
    pool.run_until(driver);

    assert_eq!(*seen.borrow(), [3], "Only the last value of the burst should arrive");
    assert!(
        started.elapsed() >= quiet,
        "Delivery must wait out the quiet period"
    );
}

#[test]
fn spaced_calls_each_deliver() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let seen_cl = Rc::clone(&seen);
    let (driver, handle) = debounce(
        move |v: u32| seen_cl.borrow_mut().push(v),
        Duration::from_millis(40),
    );
    spawner.spawn_local(driver).unwrap();
    spawner
        .spawn_local(async move {
            handle.call(1).unwrap();
            Sleep::new(Duration::from_millis(200)).await;
            handle.call(2).unwrap();
        })
        .unwrap();

    pool.run();

    assert_eq!(
        *seen.borrow(),
        [1, 2],
        "Calls separated by more than the quiet period each deliver"
    );
}

#[test]
fn calls_within_the_quiet_period_extend_the_wait() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let last_call = Rc::new(Cell::new(None));

    let quiet = Duration::from_millis(150);
    let seen_cl = Rc::clone(&seen);
    let (driver, handle) = debounce(
        move |v: u32| seen_cl.borrow_mut().push((v, Instant::now())),
        quiet,
    );
    spawner.spawn_local(driver).unwrap();
    spawner
        .spawn_local({
            let last_call = Rc::clone(&last_call);
            async move {
                handle.call(1).unwrap();
                Sleep::new(Duration::from_millis(40)).await;
                handle.call(2).unwrap();
                Sleep::new(Duration::from_millis(40)).await;
                last_call.set(Some(Instant::now()));
                handle.call(3).unwrap();
            }
        })
        .unwrap();

    pool.run();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1, "Values replaced within the quiet period never deliver");
    let (value, delivered_at) = seen[0];
    assert_eq!(value, 3, "The latest value wins");
    assert!(
        delivered_at.duration_since(last_call.get().unwrap()) >= quiet,
        "Each call should push the delivery a full quiet period out"
    );
}

#[test]
fn zero_quiet_period_still_defers_past_the_call() {
    let mut pool = LocalPool::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let seen_cl = Rc::clone(&seen);
    let (driver, handle) = debounce(move |v: u32| seen_cl.borrow_mut().push(v), Duration::ZERO);

    handle.call(7).unwrap();
    assert!(
        seen.borrow().is_empty(),
        "Even a zero quiet period must not deliver synchronously"
    );

    drop(handle);
    pool.run_until(driver);
    assert_eq!(*seen.borrow(), [7]);
}

#[test]
fn dropping_the_last_handle_flushes_the_pending_value() {
    let mut pool = LocalPool::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let seen_cl = Rc::clone(&seen);
    let (driver, handle) = debounce(
        move |v: u32| seen_cl.borrow_mut().push(v),
        Duration::from_millis(60),
    );

    handle.call(9).unwrap();
    drop(handle);

    // The driver still owes one delivery and must finish right after it.
    pool.run_until(driver);
    assert_eq!(*seen.borrow(), [9], "A pending value survives its handles");
}

#[test]
fn driver_without_pending_work_finishes_when_handles_are_gone() {
    let mut pool = LocalPool::new();
    let (driver, handle) = debounce(|_: u32| {}, Duration::from_millis(10));

    drop(handle);
    pool.run_until(driver);
}

#[test]
fn calling_after_the_driver_is_dropped_returns_the_value() {
    let (driver, handle) = debounce(|_: u32| {}, Duration::from_millis(10));
    drop(driver);

    let err = handle.call(9).unwrap_err();
    assert_eq!(err.0, 9, "The rejected value comes back to the caller");
    assert_eq!(
        err.to_string(),
        "calling a debounced function whose driver is gone"
    );
}

#[test]
fn cloned_handles_share_one_pending_slot() {
    let mut pool = LocalPool::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let seen_cl = Rc::clone(&seen);
    let (driver, handle) = debounce(
        move |v: u32| seen_cl.borrow_mut().push(v),
        Duration::from_millis(30),
    );
    let second = handle.clone();

    handle.call(1).unwrap();
    drop(handle);
    // The remaining clone keeps the debouncer alive and replaces the value.
    second.call(2).unwrap();
    drop(second);

    pool.run_until(driver);
    assert_eq!(*seen.borrow(), [2], "Clones must debounce against each other");
}

#[tokio::test]
async fn runs_on_a_tokio_local_set() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let seen = Rc::new(RefCell::new(Vec::new()));
            let seen_cl = Rc::clone(&seen);
            let (driver, handle) = debounce(
                move |v: u32| seen_cl.borrow_mut().push(v),
                Duration::from_millis(20),
            );

            let done = tokio::task::spawn_local(driver);
            handle.call(5).unwrap();
            drop(handle);

            done.await.expect("driver task failed");
            assert_eq!(*seen.borrow(), [5]);
        })
        .await;
}
