use std::time::Duration;

use macro_rules_attribute::apply;
use smol::Timer;
use smol_macros::{Executor, main};
use turnwise::{AsyncEach, EventDispatcher};

#[apply(main!)]
async fn main(ex: &Executor<'_>) {
    // An ordinary Send future shares the executor with the pipeline below.
    ex.spawn(async {
        Timer::after(Duration::from_millis(50)).await;
        println!("background job done");
    })
    .detach();

    let dispatcher = EventDispatcher::new();
    dispatcher.on("stage", |name: &&str| println!("pipeline reached {name}"));

    // The pipeline borrows the dispatcher, so it is driven right here
    // instead of being spawned.
    let (mut pipeline, _handle) = AsyncEach::new(["load", "transform", "store"], |stage, _| {
        dispatcher.fire("stage", &stage);
    });
    pipeline.on_complete(|| println!("pipeline finished"));
    pipeline.await;

    Timer::after(Duration::from_millis(120)).await;
}
