mod support;

use std::time::Duration;

use mneme_service::SyncHandle;

use support::GatedSync;

#[tokio::test]
async fn requests_coalesce_while_a_sync_is_running() {
	let target = GatedSync::new(true);
	let (handle, worker) = SyncHandle::spawn(target.clone());

	assert!(handle.request("first"));

	tokio::time::timeout(Duration::from_secs(5), target.started.notified())
		.await
		.expect("First sync was never started.");

	assert!(handle.request("second"));
	assert!(!handle.request("third"));

	target.release.notify_one();

	tokio::time::timeout(Duration::from_secs(5), target.started.notified())
		.await
		.expect("Queued sync was never started.");
	target.release.notify_one();
	drop(handle);
	worker.await.expect("Sync worker panicked.");

	assert_eq!(target.syncs(), 2);
}

#[tokio::test]
async fn fresh_index_is_not_synced() {
	let target = GatedSync::new(false);
	let (handle, worker) = SyncHandle::spawn(target.clone());

	assert!(handle.request("search"));

	drop(handle);
	worker.await.expect("Sync worker panicked.");

	assert_eq!(target.checks(), 1);
	assert_eq!(target.syncs(), 0);
}

#[tokio::test]
async fn requests_after_the_worker_stops_are_dropped() {
	let target = GatedSync::new(true);
	let (handle, worker) = SyncHandle::spawn(target.clone());

	worker.abort();

	let _ = worker.await;

	assert!(!handle.request("search"));
	assert_eq!(target.syncs(), 0);
}
