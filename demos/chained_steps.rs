use turnwise::TaskChain;

fn main() {
    let chain = TaskChain::new();

    chain
        .add_task(|_, next, _| {
            println!("building release artifact");
            next.proceed(None, Some("artifact-v2".to_string()));
        })
        .add_task(|_, next, artifact| {
            println!("uploading {}", artifact.as_deref().unwrap_or("nothing"));
            // The upload fails; hand the error to the next step instead of a result.
            next.proceed(Some("network unreachable".to_string()), None);
        })
        .add_task(|error, next, _| {
            if let Some(reason) = error {
                println!("upload failed ({reason}), retrying over fallback link");
            }
            next.proceed(None, Some("artifact-v2".to_string()));
        })
        .add_task(|_, next, artifact| {
            println!("deployed {}", artifact.as_deref().unwrap_or("nothing"));
            // Proceeding past the last step simply ends the chain.
            next.proceed(None, None);
        });

    // Nothing above has run yet; the chain waits for an explicit start.
    println!("pipeline assembled");
    chain.start();
}
