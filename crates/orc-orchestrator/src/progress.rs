//! Progress Bus (C12): a single-writer, single-reader bounded event
//! sink with a per-send deadline (spec §4.11, §9 re-architecture
//! guidance — a bounded channel, never a fire-and-forget buffer).

use orc_types::{ExecutionUpdate, UpdateType};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// Default per-message send timeout; spec §4.11/§5 specify 2-5s.
const SEND_TIMEOUT: Duration = Duration::from_secs(3);

/// Writer half of the progress bus. Cloneable so C7/C10/C11 can each
/// hold a handle without sharing a lock.
#[derive(Clone)]
pub struct ProgressSink {
    sender: mpsc::Sender<ExecutionUpdate>,
}

impl ProgressSink {
    /// Emit `update`. Bounded blocking is allowed (the sink is a bounded
    /// queue); on timeout the event is dropped and a warning logged —
    /// the executor is never blocked indefinitely by a stalled consumer.
    pub async fn emit(&self, update: ExecutionUpdate) {
        match tokio::time::timeout(SEND_TIMEOUT, self.sender.send(update.clone())).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                warn!(
                    update_type = ?update.update_type,
                    "progress sink receiver dropped, event lost"
                );
            }
            Err(_) => {
                warn!(
                    update_type = ?update.update_type,
                    step_id = ?update.step_id,
                    "progress sink send timed out, event dropped"
                );
            }
        }
    }

    pub async fn emit_kind(
        &self,
        execution_id: &str,
        update_type: UpdateType,
        step_id: Option<&str>,
        message: impl Into<String>,
    ) {
        let mut update = ExecutionUpdate::new(update_type, execution_id).with_message(message);
        if let Some(step_id) = step_id {
            update = update.with_step(step_id.to_string());
        }
        self.emit(update).await;
    }
}

/// Create a bounded progress channel. `capacity` of `0` is valid: every
/// send blocks until a receiver is waiting, or times out (spec §8
/// boundary case "Progress sink with capacity 0").
pub fn channel(capacity: usize) -> (ProgressSink, mpsc::Receiver<ExecutionUpdate>) {
    let capacity = capacity.max(1);
    let (sender, receiver) = mpsc::channel(capacity);
    (ProgressSink { sender }, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emitted_update_is_received() {
        let (sink, mut rx) = channel(4);
        sink.emit_kind("exec-1", UpdateType::ExecutionStarted, None, "starting")
            .await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.update_type, UpdateType::ExecutionStarted);
        assert_eq!(received.message, "starting");
    }

    #[tokio::test]
    async fn send_to_dropped_receiver_does_not_panic() {
        let (sink, rx) = channel(1);
        drop(rx);
        sink.emit_kind("exec-1", UpdateType::ExecutionCompleted, None, "done")
            .await;
    }
}
