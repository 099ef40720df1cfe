//! Reactive wrapper around the projector.
//!
//! A [`PlaybackViewModel`] follows one [`SessionSource`] at a time. Sources
//! post snapshots into the view model inbox from any thread; the owning
//! thread drains it with [`PlaybackViewModel::process_pending`] or
//! [`PlaybackViewModel::wait_for_update`], recomputes the [`PlaybackView`]
//! and publishes [`PlaybackEvent`]s to observers.
//!
//! ## Source switching
//!
//! Each call to [`PlaybackViewModel::set_source`] bumps a generation
//! counter shared with every sink and sampler handed out so far. Messages
//! carry the generation they were produced under and are dropped when it
//! is no longer current, so nothing from a previous source is observable
//! after the switch.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use tracing::{debug, trace};

use crate::config::PlaybackConfig;
use crate::controller::PlaybackController;
use crate::events::{PlaybackEvent, PlaybackEventBus};
use crate::model::SessionSnapshot;
use crate::progress::ProgressSampler;
use crate::projection::{PlaybackView, Progress, project};
use crate::source::{Inbound, Mailbox, SessionSource, SnapshotSink, Subscription};

pub struct PlaybackViewModel {
    config: PlaybackConfig,
    generation: Arc<AtomicU64>,
    inbox_tx: Sender<Inbound>,
    inbox_rx: Receiver<Inbound>,
    source: Option<Arc<dyn SessionSource>>,
    subscription: Option<Subscription>,
    sampler: Option<ProgressSampler>,
    sampler_epoch: u64,
    snapshot: Option<SessionSnapshot>,
    state: PlaybackView,
    bus: PlaybackEventBus,
}

impl PlaybackViewModel {
    pub fn new(config: PlaybackConfig) -> Self {
        let (inbox_tx, inbox_rx) = unbounded();
        Self {
            config,
            generation: Arc::new(AtomicU64::new(0)),
            inbox_tx,
            inbox_rx,
            source: None,
            subscription: None,
            sampler: None,
            sampler_epoch: 0,
            snapshot: None,
            state: PlaybackView::default(),
            bus: PlaybackEventBus::new(),
        }
    }

    /// Follows `source` from now on, or no session at all with `None`.
    ///
    /// Setting the source currently followed is a no-op. Otherwise the old
    /// source is unsubscribed, the state is recomputed from the new
    /// source's current snapshot and a `SessionChanged` event is published.
    pub fn set_source(&mut self, source: Option<Arc<dyn SessionSource>>) {
        let unchanged = match (&self.source, &source) {
            (None, None) => true,
            (Some(current), Some(next)) => Arc::ptr_eq(current, next),
            _ => false,
        };
        if unchanged {
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.stop_sampler();
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        debug!(
            generation,
            has_source = source.is_some(),
            "Switching session source"
        );

        self.source = source;
        let snapshot = match &self.source {
            Some(source) => {
                let sink = SnapshotSink::new(self.mailbox(generation));
                self.subscription = Some(source.subscribe(sink));
                Some(source.snapshot())
            }
            None => None,
        };

        self.apply(snapshot);
        self.bus.broadcast(PlaybackEvent::SessionChanged {
            package_name: self.state.package_name.clone(),
        });
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Handles every message already in the inbox. Returns how many of them
    /// were current.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.inbox_rx.try_recv() {
            if self.handle(message) {
                applied += 1;
            }
        }
        applied
    }

    /// Blocks until a message arrives or `timeout` elapses, then handles
    /// everything pending. Returns how many messages were current.
    pub fn wait_for_update(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut applied = 0;
        while applied == 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.inbox_rx.recv_timeout(remaining) {
                Ok(message) => {
                    if self.handle(message) {
                        applied += 1;
                    }
                    applied += self.process_pending();
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        applied
    }

    /// Latest derived state.
    pub fn state(&self) -> &PlaybackView {
        &self.state
    }

    /// Snapshot the current state was derived from.
    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_sampling_progress(&self) -> bool {
        self.sampler
            .as_ref()
            .is_some_and(ProgressSampler::is_running)
    }

    #[cfg(test)]
    fn sampler_liveness(&self) -> Option<std::sync::Weak<()>> {
        self.sampler.as_ref().map(ProgressSampler::liveness)
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Receiver of every event published from now on.
    pub fn subscribe(&self) -> Receiver<PlaybackEvent> {
        self.bus.subscribe()
    }

    /// Command façade for the current source.
    pub fn controller(&self) -> PlaybackController {
        PlaybackController::new(self.source.as_ref().and_then(|s| s.transport_controls()))
    }

    fn mailbox(&self, generation: u64) -> Mailbox {
        let current = Arc::clone(&self.generation);
        Mailbox::new(generation, current, self.inbox_tx.clone())
    }

    /// Progress samples must also come from the sampler currently running.
    fn is_current(&self, message: &Inbound) -> bool {
        let current = self.generation();
        match message {
            Inbound::Snapshot { generation, .. } => *generation == current,
            Inbound::Progress {
                generation,
                epoch,
                ..
            } => {
                let sampling = self.sampler.as_ref().map(ProgressSampler::epoch);
                *generation == current && sampling == Some(*epoch)
            }
        }
    }

    fn handle(&mut self, message: Inbound) -> bool {
        if !self.is_current(&message) {
            trace!(current = self.generation(), ?message, "Discarding stale update");
            return false;
        }
        match message {
            Inbound::Snapshot { snapshot, .. } => self.apply(Some(snapshot)),
            Inbound::Progress { progress, .. } => self.update_progress(progress),
        }
        true
    }

    fn apply(&mut self, snapshot: Option<SessionSnapshot>) {
        let next = project(snapshot.as_ref());
        let old_transport = self.snapshot.as_ref().and_then(|s| s.transport.as_ref());
        let new_transport = snapshot.as_ref().and_then(|s| s.transport.as_ref());
        let transport_changed = old_transport != new_transport;
        let max_changed = self.state.max_progress != next.max_progress;

        let previous = std::mem::replace(&mut self.state, next);
        self.snapshot = snapshot;

        if !self.state.is_playing {
            self.stop_sampler();
        } else if self.sampler.is_none() || transport_changed || max_changed {
            self.start_sampler();
        }

        self.publish_changes(&previous);
    }

    fn start_sampler(&mut self) {
        self.stop_sampler();
        let Some(transport) = self.snapshot.as_ref().and_then(|s| s.transport.clone()) else {
            return;
        };
        self.sampler_epoch += 1;
        let mailbox = self.mailbox(self.generation());
        self.sampler = Some(ProgressSampler::start(
            self.config.progress_interval(),
            transport,
            self.state.max_progress,
            mailbox,
            self.sampler_epoch,
        ));
    }

    fn stop_sampler(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            sampler.cancel();
        }
    }

    fn update_progress(&mut self, progress: Progress) {
        if self.state.progress == progress {
            return;
        }
        self.state.progress = progress;
        let bus = &self.bus;
        bus.broadcast(PlaybackEvent::ProgressChanged {
            progress,
            max_progress: self.state.max_progress,
        });
        bus.broadcast(PlaybackEvent::StateChanged(self.state.clone()));
    }

    fn publish_changes(&self, previous: &PlaybackView) {
        let state = &self.state;
        if *previous == *state {
            return;
        }
        let bus = &self.bus;
        if previous.main_action != state.main_action {
            bus.broadcast(PlaybackEvent::MainActionChanged(state.main_action));
        }
        if previous.progress != state.progress || previous.max_progress != state.max_progress {
            bus.broadcast(PlaybackEvent::ProgressChanged {
                progress: state.progress,
                max_progress: state.max_progress,
            });
        }
        if previous.queue != state.queue {
            bus.broadcast(PlaybackEvent::QueueChanged(state.queue.clone()));
        }
        if previous.custom_actions != state.custom_actions {
            let actions = state.custom_actions.clone();
            bus.broadcast(PlaybackEvent::CustomActionsChanged(actions));
        }
        bus.broadcast(PlaybackEvent::StateChanged(state.clone()));
    }

    fn teardown(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.stop_sampler();
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.source = None;
    }
}

impl Default for PlaybackViewModel {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

impl Drop for PlaybackViewModel {
    fn drop(&mut self) {
        self.teardown();
    }
}
