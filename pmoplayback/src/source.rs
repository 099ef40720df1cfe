//! Session sources and the generation-tagged plumbing between them and the
//! view model.
//!
//! Every value a source emits travels through a [`SnapshotSink`] tagged with
//! the generation that was current when the sink was handed out. When the
//! view model switches source it bumps the shared generation, so anything
//! the old source emits afterwards is dropped, both at emission time and
//! again when the view model drains its inbox.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crossbeam_channel::Sender;
use tracing::trace;

use crate::controller::TransportControls;
use crate::model::SessionSnapshot;
use crate::projection::Progress;

/// Message posted to a view model inbox.
#[derive(Debug)]
pub(crate) enum Inbound {
    Snapshot {
        generation: u64,
        snapshot: SessionSnapshot,
    },
    Progress {
        generation: u64,
        epoch: u64,
        progress: Progress,
    },
}

/// Sender side of a view model inbox, bound to one generation.
#[derive(Clone)]
pub(crate) struct Mailbox {
    generation: u64,
    current: Arc<AtomicU64>,
    tx: Sender<Inbound>,
}

impl Mailbox {
    pub(crate) fn new(generation: u64, current: Arc<AtomicU64>, tx: Sender<Inbound>) -> Self {
        Self {
            generation,
            current,
            tx,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    /// Posts `message` unless the generation is stale or the inbox is gone.
    pub(crate) fn post(&self, message: Inbound) -> bool {
        if !self.is_current() {
            trace!(
                generation = self.generation,
                "Dropping message from stale generation"
            );
            return false;
        }
        self.tx.send(message).is_ok()
    }
}

/// Handed to [`SessionSource::subscribe`]; forwards snapshots to one view
/// model for as long as the subscription is current.
#[derive(Clone)]
pub struct SnapshotSink {
    mailbox: Mailbox,
}

impl SnapshotSink {
    pub(crate) fn new(mailbox: Mailbox) -> Self {
        Self { mailbox }
    }

    /// Forwards a snapshot. Returns false once the sink is stale or its view
    /// model is gone; sources should forget the sink at that point.
    pub fn emit(&self, snapshot: SessionSnapshot) -> bool {
        self.mailbox.post(Inbound::Snapshot {
            generation: self.mailbox.generation(),
            snapshot,
        })
    }

    pub fn is_current(&self) -> bool {
        self.mailbox.is_current()
    }
}

impl fmt::Debug for SnapshotSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotSink")
            .field("generation", &self.mailbox.generation)
            .field("current", &self.is_current())
            .finish()
    }
}

/// Unsubscribes when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to release.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// A media session as seen by the view model.
pub trait SessionSource: Send + Sync {
    /// Current snapshot of the session.
    fn snapshot(&self) -> SessionSnapshot;

    /// Registers `sink` for future snapshots until the returned
    /// subscription is released.
    fn subscribe(&self, sink: SnapshotSink) -> Subscription;

    /// Command sink for this session, if it accepts commands.
    fn transport_controls(&self) -> Option<Arc<dyn TransportControls>> {
        None
    }
}

#[derive(Default)]
struct SharedSessionInner {
    snapshot: SessionSnapshot,
    sinks: Vec<(u64, SnapshotSink)>,
    next_id: u64,
}

/// In-process [`SessionSource`] whose snapshot is replaced by its owner.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<SharedSessionInner>>,
    controls: Option<Arc<dyn TransportControls>>,
}

impl SharedSession {
    pub fn new(snapshot: SessionSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SharedSessionInner {
                snapshot,
                ..SharedSessionInner::default()
            })),
            controls: None,
        }
    }

    pub fn with_controls(mut self, controls: Arc<dyn TransportControls>) -> Self {
        self.controls = Some(controls);
        self
    }

    /// Replaces the snapshot and notifies subscribers.
    pub fn publish(&self, snapshot: SessionSnapshot) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.snapshot = snapshot.clone();
        inner.sinks.retain(|(_, sink)| sink.emit(snapshot.clone()));
    }

    /// Edits the current snapshot in place, then publishes it.
    pub fn update(&self, edit: impl FnOnce(&mut SessionSnapshot)) {
        let mut snapshot = self.snapshot();
        edit(&mut snapshot);
        self.publish(snapshot);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sinks
            .len()
    }
}

impl SessionSource for SharedSession {
    fn snapshot(&self) -> SessionSnapshot {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    fn subscribe(&self, sink: SnapshotSink) -> Subscription {
        let id = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.sinks.push((id, sink));
            id
        };

        let weak: Weak<Mutex<SharedSessionInner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
                inner.sinks.retain(|(sink_id, _)| *sink_id != id);
            }
        })
    }

    fn transport_controls(&self) -> Option<Arc<dyn TransportControls>> {
        self.controls.clone()
    }
}

impl fmt::Debug for SharedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSession")
            .field("subscribers", &self.subscriber_count())
            .field("has_controls", &self.controls.is_some())
            .finish()
    }
}
