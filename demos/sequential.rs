use turnwise::AsyncEach;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let files = vec!["report.pdf", "photo.png", "notes.txt"];
            let (mut upload, _upload_handle) = AsyncEach::new(files, |file, index| {
                println!("uploading {index}: {file}");
            });

            // An endless scan on the same executor; turns alternate between
            // the two runs until somebody aborts it.
            let (scan, scan_handle) = AsyncEach::new(0.., |sector, _| {
                println!("scanning sector {sector}");
            });

            let stop_scan = scan_handle.clone();
            upload.on_complete(move || {
                println!("all files uploaded, calling off the scan");
                stop_scan.abort();
            });

            let upload = tokio::task::spawn_local(upload);
            let scan = tokio::task::spawn_local(scan);

            upload.await.unwrap();
            scan.await.unwrap();
            println!("scan aborted: {}", scan_handle.is_aborted());
        })
        .await;
}
