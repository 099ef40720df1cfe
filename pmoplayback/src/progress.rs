//! Periodic progress sampling while a session is playing.
//!
//! Sessions only report their position when something changes, so while
//! playing the view model runs a [`ProgressSampler`]: a small thread that
//! extrapolates the position at a fixed interval and posts it back to the
//! view model inbox. The sampler is cancelled as soon as playback stops,
//! the source changes or the view model goes away.

use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, bounded, select, tick};
use tracing::{debug, error};

use crate::model::TransportState;
use crate::projection::sample_progress;
use crate::source::{Inbound, Mailbox};

pub(crate) struct ProgressSampler {
    epoch: u64,
    // upgradeable only while the sampling thread is alive
    liveness: Weak<()>,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressSampler {
    /// Starts sampling `transport` every `interval`.
    ///
    /// Samples are tagged with the mailbox generation and `epoch`; the
    /// thread exits on its own once the mailbox generation goes stale.
    pub(crate) fn start(
        interval: Duration,
        transport: TransportState,
        max_progress: u64,
        mailbox: Mailbox,
        epoch: u64,
    ) -> Self {
        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        let alive = Arc::new(());
        let liveness = Arc::downgrade(&alive);

        let spawned = thread::Builder::new()
            .name("pmoplayback-progress".to_string())
            .spawn(move || {
                let _alive = alive;
                let ticker = tick(interval);
                loop {
                    let stop = select! {
                        recv(cancel_rx) -> _ => true,
                        recv(ticker) -> _ => {
                            let now = Instant::now();
                            let progress = sample_progress(Some(&transport), max_progress, now);
                            !mailbox.post(Inbound::Progress {
                                generation: mailbox.generation(),
                                epoch,
                                progress,
                            })
                        }
                    };
                    if stop {
                        break;
                    }
                }
                debug!(epoch, "Progress sampler stopped");
            });

        let handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Unable to start progress sampler: {}", e);
                None
            }
        };

        Self {
            epoch,
            liveness,
            cancel: Some(cancel_tx),
            handle,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_running(&self) -> bool {
        self.liveness.strong_count() > 0
    }

    #[cfg(test)]
    pub(crate) fn liveness(&self) -> Weak<()> {
        self.liveness.clone()
    }

    /// Stops the thread and waits for it to exit.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // dropping the sender disconnects cancel_rx and wakes the select
        self.cancel.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!(epoch = self.epoch, "Progress sampler thread panicked");
            }
        }
    }
}

impl Drop for ProgressSampler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use crossbeam_channel::unbounded;

    use super::*;
    use crate::model::PlaybackStatus;

    fn playing_at(position: u64) -> TransportState {
        TransportState::new(PlaybackStatus::Playing)
            .with_position(Some(position), Instant::now())
    }

    #[test]
    fn test_sampler_posts_tagged_progress() {
        let current = Arc::new(AtomicU64::new(3));
        let (tx, rx) = unbounded();
        let mailbox = Mailbox::new(3, Arc::clone(&current), tx);

        let interval = Duration::from_millis(10);
        let sampler = ProgressSampler::start(interval, playing_at(1_000), 60_000, mailbox, 7);

        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            Inbound::Progress {
                generation,
                epoch,
                progress,
            } => {
                assert_eq!(generation, 3);
                assert_eq!(epoch, 7);
                assert!(progress.as_millis().unwrap() >= 1_000);
            }
            other => panic!("unexpected message {other:?}"),
        }
        assert!(sampler.is_running());
        sampler.cancel();
    }

    #[test]
    fn test_cancelled_sampler_stops_posting() {
        let current = Arc::new(AtomicU64::new(1));
        let (tx, rx) = unbounded();
        let mailbox = Mailbox::new(1, Arc::clone(&current), tx);

        let interval = Duration::from_millis(5);
        let sampler = ProgressSampler::start(interval, playing_at(0), 60_000, mailbox, 1);
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let liveness = sampler.liveness();
        drop(sampler);
        assert_eq!(liveness.strong_count(), 0);

        // drain what was posted before cancellation, then expect silence
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_sampler_exits_when_generation_is_stale() {
        let current = Arc::new(AtomicU64::new(1));
        let (tx, rx) = unbounded();
        let mailbox = Mailbox::new(1, Arc::clone(&current), tx);

        let interval = Duration::from_millis(5);
        let sampler = ProgressSampler::start(interval, playing_at(0), 60_000, mailbox, 1);
        current.store(2, Ordering::SeqCst);

        let deadline = Instant::now() + Duration::from_secs(2);
        while sampler.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!sampler.is_running());
        while let Ok(message) = rx.try_recv() {
            assert!(matches!(message, Inbound::Progress { .. }));
        }
    }
}
