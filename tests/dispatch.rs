use std::{cell::RefCell, rc::Rc};

use turnwise::EventDispatcher;

#[test]
fn handlers_run_in_registration_order() {
    let order = Rc::new(RefCell::new(String::new()));
    let order_cl1 = Rc::clone(&order);
    let order_cl2 = Rc::clone(&order);
    let order_cl3 = Rc::clone(&order);

    let events: EventDispatcher<()> = EventDispatcher::new();
    events
        .on("step", move |_| order_cl1.borrow_mut().push_str("1"))
        .on("step", move |_| order_cl2.borrow_mut().push_str("2"))
        .on("step", move |_| order_cl3.borrow_mut().push_str("3"));

    events.fire("step", &());

    assert_eq!(
        *order.borrow(),
        "123",
        "Handlers should run in registration order"
    );

    events.fire("step", &());
    assert_eq!(
        *order.borrow(),
        "123123",
        "Every fire should run the full handler list again"
    );
}

#[test]
fn payload_reaches_every_handler() {
    let total = Rc::new(RefCell::new(0));
    let total_cl1 = Rc::clone(&total);
    let total_cl2 = Rc::clone(&total);

    let events: EventDispatcher<i32> = EventDispatcher::new();
    events
        .on("add", move |n| *total_cl1.borrow_mut() += n)
        .on("add", move |n| *total_cl2.borrow_mut() += n * 10);

    events.fire("add", &2).fire("add", &3);

    assert_eq!(
        *total.borrow(),
        55,
        "Both handlers should have seen both payloads"
    );
}

#[test]
fn unknown_event_is_silent() {
    let ran = Rc::new(RefCell::new(false));
    let ran_cl = Rc::clone(&ran);

    let events: EventDispatcher<()> = EventDispatcher::new();
    events.fire("missing", &());

    events.on("known", move |_| *ran_cl.borrow_mut() = true);
    events.fire("still-missing", &());

    assert!(
        !*ran.borrow(),
        "Firing unknown events should not run handlers of other events"
    );
}

#[test]
fn events_are_independent() {
    let order = Rc::new(RefCell::new(String::new()));
    let order_cl1 = Rc::clone(&order);
    let order_cl2 = Rc::clone(&order);

    let events: EventDispatcher<()> = EventDispatcher::new();
    events
        .on("first", move |_| order_cl1.borrow_mut().push_str("1"))
        .on("second", move |_| order_cl2.borrow_mut().push_str("2"));

    events.fire("second", &());
    events.fire("first", &());

    assert_eq!(
        *order.borrow(),
        "21",
        "Only the fired event's handlers should run"
    );
}

#[test]
fn handlers_added_during_dispatch_run_from_next_fire() {
    let order = Rc::new(RefCell::new(String::new()));
    let order_cl1 = Rc::clone(&order);
    let order_cl2 = Rc::clone(&order);

    let events = Rc::new(EventDispatcher::<()>::new());
    let events_cl = Rc::clone(&events);

    events.on("grow", move |_| {
        order_cl1.borrow_mut().push_str("a");
        let order_inner = Rc::clone(&order_cl2);
        events_cl.on("grow", move |_| order_inner.borrow_mut().push_str("b"));
    });

    events.fire("grow", &());
    assert_eq!(
        *order.borrow(),
        "a",
        "A handler registered during dispatch should not run in that round"
    );

    events.fire("grow", &());
    assert_eq!(
        *order.borrow(),
        "aab",
        "The handler registered during the first fire should run in the second"
    );
}

#[test]
fn handler_state_persists_across_fires() {
    let events: EventDispatcher<()> = EventDispatcher::new();
    let count = Rc::new(RefCell::new(0));
    let count_cl = Rc::clone(&count);

    let mut seen = 0;
    events.on("tick", move |_| {
        seen += 1;
        *count_cl.borrow_mut() = seen;
    });

    events.fire("tick", &()).fire("tick", &()).fire("tick", &());

    assert_eq!(
        *count.borrow(),
        3,
        "A handler's captured state should persist between fires"
    );
}

#[test]
fn panicking_handler_unwinds_but_dispatcher_survives() {
    let order = Rc::new(RefCell::new(String::new()));
    let order_cl1 = Rc::clone(&order);
    let order_cl2 = Rc::clone(&order);
    let order_cl3 = Rc::clone(&order);

    let events: EventDispatcher<()> = EventDispatcher::new();
    events
        .on("boom", move |_| order_cl1.borrow_mut().push_str("1"))
        .on("boom", |_| panic!("handler failure"))
        .on("boom", move |_| order_cl2.borrow_mut().push_str("3"));
    events.on("after", move |_| order_cl3.borrow_mut().push_str("4"));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        events.fire("boom", &());
    }));

    assert!(result.is_err(), "The handler panic should propagate out");
    assert_eq!(
        *order.borrow(),
        "1",
        "Handlers after the panicking one should be skipped for that fire"
    );

    events.fire("after", &());
    assert_eq!(
        *order.borrow(),
        "14",
        "The dispatcher should stay usable after a handler panicked"
    );
}
