use std::{cell::RefCell, rc::Rc};

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use turnwise::{AsyncEach, LatestWins, Request};

fn main() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();

    let query = Rc::new(RefCell::new(String::new()));

    // Each search scans four result pages; starting a new one aborts
    // whatever scan is still in flight.
    let mut search = LatestWins::new({
        let query = Rc::clone(&query);
        let spawner = spawner.clone();
        move |request: Request<String>| {
            let term = query.borrow().clone();
            let hits = Rc::new(RefCell::new(0u32));
            let (mut scan, handle) = AsyncEach::new(0..4, {
                let term = term.clone();
                let hits = Rc::clone(&hits);
                move |page, _| {
                    println!("scanning page {page} for {term:?}");
                    *hits.borrow_mut() += 3;
                }
            });
            scan.on_complete(move || {
                request.complete(format!("{} hits for {term:?}", hits.borrow()));
            });
            spawner.spawn_local(scan).expect("spawning the scan");
            handle
        }
    });

    // The first search never gets a turn before the user types again.
    *query.borrow_mut() = "rust".into();
    search.start(
        Request::new(|summary| println!("{summary}"))
            .on_abort(|| println!("search for \"rust\" cancelled")),
    );

    *query.borrow_mut() = "rust async".into();
    search.start(Request::new(|summary| println!("{summary}")));

    pool.run();

    // With the field quiet, a later search runs to completion undisturbed.
    *query.borrow_mut() = "tokio".into();
    search.start(Request::new(|summary| println!("{summary}")));
    pool.run();
}
