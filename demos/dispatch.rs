use turnwise::EventDispatcher;

fn main() {
    let dispatcher = EventDispatcher::new();

    // Several independent parties subscribe to the same lifecycle events.
    dispatcher
        .on("progress", |percent: &u32| {
            println!("progress bar at {percent}%");
        })
        .on("progress", |percent| {
            if *percent >= 50 {
                println!("logger: past the halfway mark");
            }
        })
        .on("done", |_| {
            println!("download finished, enabling the open button");
        });

    // The producer fires events without knowing who listens.
    for percent in [10, 50, 90] {
        dispatcher.fire("progress", &percent);
    }
    dispatcher.fire("done", &100);

    // Events nobody subscribed to are silently ignored.
    dispatcher.fire("cancelled", &0);
}
