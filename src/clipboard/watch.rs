use anyhow::{Context, Result};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default clipboard polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Recurring timer running a tick callback on one background thread
///
/// Ticks run sequentially on that thread, so a tick never overlaps the
/// previous one. Stopping wakes the thread immediately instead of waiting
/// out the interval.
pub struct Poller {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Spawn the timer thread; the first tick fires after one interval
    pub fn start<F>(interval: Duration, mut tick: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("clipstack-poll".to_string())
            .spawn(move || {
                log::debug!("Clipboard poller started ({:?} interval)", interval);
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => tick(),
                        // Explicit stop or owner dropped
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                log::debug!("Clipboard poller stopped");
            })
            .context("Failed to spawn clipboard poller thread")?;

        Ok(Poller {
            stop_tx,
            handle: Some(handle),
        })
    }

    /// Stop the timer and wait for an in-flight tick to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                // Stopped from inside a tick; the loop exits on its next wakeup
                return;
            }
            if handle.join().is_err() {
                log::error!("Clipboard poller thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    #[test]
    fn test_ticks_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let poller = Poller::start(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while count.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        poller.stop();

        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop >= 3);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(count.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_stop_does_not_wait_for_interval() {
        let poller = Poller::start(Duration::from_secs(60), || {}).unwrap();
        let started = Instant::now();
        poller.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
