//! Stream-head maintainer.
//!
//! A channel-fed background task that updates the best-effort stream-head
//! summary after a successful commit or snapshot append: one long-lived
//! task, a `tokio::sync::mpsc` channel, and a `CancellationToken` for
//! shutdown. The contract: never blocks the caller, never raises into it.

use eventstore_domain::StreamId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A stream-head mutation enqueued by a successful write.
#[derive(Debug, Clone, Copy)]
pub enum HeadUpdate {
    /// A commit landed on `stream_id` at `revision`.
    CommitAppended {
        /// Stream that received the commit.
        stream_id: StreamId,
        /// The committed stream revision.
        revision: u64,
    },
    /// A snapshot landed on `stream_id` at `revision`.
    SnapshotAdded {
        /// Stream that received the snapshot.
        stream_id: StreamId,
        /// The snapshot's revision.
        revision: u64,
    },
}

/// Applies a [`HeadUpdate`] to a backend's stream-head storage.
///
/// Implementations must use a non-optimistic, last-write-wins update;
/// monotonicity is not enforced at the backend.
#[async_trait::async_trait]
pub trait HeadSink: Send + Sync {
    /// Apply one update. Errors are logged by the maintainer and
    /// otherwise swallowed; they never propagate to a `commit()` caller.
    async fn apply(&self, update: HeadUpdate) -> anyhow::Result<()>;
}

/// Bounded capacity for the maintainer's channel. A full channel means the
/// maintainer is falling behind; updates are dropped rather than applying
/// backpressure, since the head is always rebuildable from the log.
const CHANNEL_CAPACITY: usize = 1024;

/// Handle to a running stream-head maintainer task.
///
/// Dropping the handle's sender (by dropping the handle) lets the
/// background task observe channel closure and exit its receive loop;
/// there is no need to await it.
pub struct MaintainerHandle {
    sender: mpsc::Sender<HeadUpdate>,
    shutdown: CancellationToken,
}

impl MaintainerHandle {
    /// Spawn the maintainer task against the given sink.
    pub fn spawn(sink: impl HeadSink + 'static) -> Self {
        let (sender, mut receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let shutdown = CancellationToken::new();
        let task_shutdown = shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_shutdown.cancelled() => {
                        debug!("stream head maintainer shutting down");
                        break;
                    }
                    update = receiver.recv() => {
                        match update {
                            Some(update) => {
                                if let Err(error) = sink.apply(update).await {
                                    warn!(
                                        %error,
                                        "stream head update failed, will be rebuilt from commit log"
                                    );
                                }
                            }
                            None => break,
                        }
                    }
                }
            }
        });

        Self { sender, shutdown }
    }

    /// Enqueue an update. Never blocks the caller: a full channel drops
    /// the update (logged at debug level) instead of awaiting capacity.
    pub fn enqueue(&self, update: HeadUpdate) {
        if self.sender.try_send(update).is_err() {
            debug!("stream head maintainer channel full or closed, dropping update");
        }
    }
}

impl Drop for MaintainerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSink {
        applied: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl HeadSink for CountingSink {
        async fn apply(&self, _update: HeadUpdate) -> anyhow::Result<()> {
            self.applied.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn enqueued_updates_are_eventually_applied() {
        let applied = Arc::new(AtomicUsize::new(0));
        let handle = MaintainerHandle::spawn(CountingSink {
            applied: applied.clone(),
        });

        handle.enqueue(HeadUpdate::CommitAppended {
            stream_id: StreamId::generate(),
            revision: 1,
        });
        handle.enqueue(HeadUpdate::SnapshotAdded {
            stream_id: StreamId::generate(),
            revision: 1,
        });

        // Give the background task a chance to drain the channel.
        for _ in 0..100 {
            if applied.load(Ordering::SeqCst) == 2 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert_eq!(applied.load(Ordering::SeqCst), 2);
    }

    struct FailingSink;

    #[async_trait::async_trait]
    impl HeadSink for FailingSink {
        async fn apply(&self, _update: HeadUpdate) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
    }

    #[tokio::test]
    async fn sink_failures_never_panic_or_block_enqueue() {
        let handle = MaintainerHandle::spawn(FailingSink);

        handle.enqueue(HeadUpdate::CommitAppended {
            stream_id: StreamId::generate(),
            revision: 1,
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        // No panic means the failure was swallowed as required.
    }
}
