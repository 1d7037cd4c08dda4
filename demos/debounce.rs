use std::time::Duration;
use tokio::time::sleep;
use turnwise::debounce;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            // Run the search at most once per quiet period, with the freshest input.
            let (driver, search) = debounce(
                |query: String| println!("searching for {query:?}"),
                Duration::from_millis(100),
            );
            let driver = tokio::task::spawn_local(driver);

            // A burst of keystrokes; only the final state triggers a search.
            for prefix in ["r", "ru", "rus", "rust"] {
                search.call(prefix.to_string()).unwrap();
                sleep(Duration::from_millis(30)).await;
            }

            // The user pauses and the debounced search fires.
            sleep(Duration::from_millis(200)).await;

            // A later call starts a fresh quiet period.
            search.call("rust async".to_string()).unwrap();

            drop(search);
            driver.await.unwrap();
        })
        .await;
}
