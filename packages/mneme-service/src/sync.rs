//! Fire-and-forget index freshness checks.
//!
//! Searches only enqueue a request. The worker runs on its own task and at most one request waits
//! behind the running sync, so bursts of searches coalesce into a single follow-up sync.

use std::sync::Arc;

use tokio::{
	sync::mpsc::{self, error::TrySendError},
	task::JoinHandle,
};

use crate::IndexSync;

#[derive(Clone, Debug)]
pub struct SyncHandle {
	tx: mpsc::Sender<String>,
}
impl SyncHandle {
	/// Starts the worker. It exits once every handle has been dropped and the queue is drained.
	pub fn spawn(target: Arc<dyn IndexSync>) -> (Self, JoinHandle<()>) {
		let (tx, rx) = mpsc::channel(1);
		let worker = tokio::spawn(run_worker(target, rx));

		(Self { tx }, worker)
	}

	/// Queues a sync without waiting for it. Returns whether a new request was queued.
	pub fn request(&self, reason: &str) -> bool {
		match self.tx.try_send(reason.to_string()) {
			Ok(()) => true,
			Err(TrySendError::Full(_)) => {
				tracing::debug!(reason, "Index sync already queued.");

				false
			},
			Err(TrySendError::Closed(_)) => {
				tracing::warn!(reason, "Index sync worker is not running.");

				false
			},
		}
	}
}

async fn run_worker(target: Arc<dyn IndexSync>, mut rx: mpsc::Receiver<String>) {
	while let Some(reason) = rx.recv().await {
		if !target.is_dirty() {
			tracing::debug!(reason = %reason, "Index is fresh. Skipping sync.");

			continue;
		}
		if let Err(err) = target.sync(&reason).await {
			tracing::error!(error = %err, reason = %reason, "Index sync failed.");
		}
	}
}
