//! Trailing-edge debouncer for mirror pushes
//!
//! Every local change schedules a push; the debouncer waits for a quiet
//! period and then emits only the most recent snapshot. Intermediate
//! snapshots are dropped, never transmitted. Closing the input flushes the
//! pending snapshot immediately.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle for scheduling debounced values
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Schedule a value, restarting the quiet-period timer
    pub fn schedule(&self, value: T) {
        // The receiving task lives as long as self
        let _ = self.tx.send(value);
    }

    /// Drop the input side and wait for the pending value to flush
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.task.await;
    }
}

/// Create a debouncer emitting the latest value after `delay` of quiet
///
/// Returns the scheduling handle and the output channel carrying the
/// debounced values.
pub fn debounce<T: Send + 'static>(delay: Duration) -> (Debouncer<T>, mpsc::UnboundedReceiver<T>) {
    let (in_tx, mut in_rx) = mpsc::unbounded_channel::<T>();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<T>();

    let task = tokio::spawn(async move {
        while let Some(mut latest) = in_rx.recv().await {
            let mut closed = false;
            loop {
                tokio::select! {
                    next = in_rx.recv() => match next {
                        // A newer snapshot supersedes the pending one
                        Some(value) => latest = value,
                        None => {
                            closed = true;
                            break;
                        }
                    },
                    _ = tokio::time::sleep(delay) => break,
                }
            }
            debug!("debounce window elapsed, emitting latest snapshot");
            if out_tx.send(latest).is_err() || closed {
                return;
            }
        }
    });

    (Debouncer { tx: in_tx, task }, out_rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_value_is_emitted() {
        let (debouncer, mut rx) = debounce::<u32>(Duration::from_secs(2));

        debouncer.schedule(1);
        debouncer.schedule(2);
        debouncer.schedule(3);

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(rx.recv().await, Some(3));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_value_restarts_the_window() {
        let (debouncer, mut rx) = debounce::<u32>(Duration::from_secs(2));

        debouncer.schedule(1);
        tokio::time::advance(Duration::from_secs(1)).await;
        // Still within the window, nothing emitted yet
        assert!(rx.try_recv().is_err());

        debouncer.schedule(2);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_value() {
        let (debouncer, mut rx) = debounce::<u32>(Duration::from_secs(60));

        debouncer.schedule(7);
        debouncer.shutdown().await;

        assert_eq!(rx.recv().await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_quiet_periods_emit_separately() {
        let (debouncer, mut rx) = debounce::<u32>(Duration::from_secs(2));

        debouncer.schedule(1);
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(rx.recv().await, Some(1));

        debouncer.schedule(2);
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(rx.recv().await, Some(2));
    }
}
