use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::projection::{
    CustomActionDescriptor, MainAction, MediaItemMetadata, PlaybackView, Progress,
};

/// Change notifications published by [`crate::PlaybackViewModel`].
///
/// `StateChanged` carries the whole view after every change, progress
/// ticks from the sampler included; the other variants let observers
/// follow a single field.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackEvent {
    StateChanged(PlaybackView),
    MainActionChanged(MainAction),
    ProgressChanged {
        progress: Progress,
        max_progress: u64,
    },
    QueueChanged(Vec<MediaItemMetadata>),
    CustomActionsChanged(Vec<CustomActionDescriptor>),
    SessionChanged {
        package_name: Option<String>,
    },
}

#[derive(Clone, Default)]
pub(crate) struct PlaybackEventBus {
    subscribers: Arc<Mutex<Vec<Sender<PlaybackEvent>>>>,
}

impl PlaybackEventBus {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn subscribe(&self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = unbounded::<PlaybackEvent>();
        {
            let mut subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            subscribers.push(tx);
        }
        rx
    }

    pub(crate) fn broadcast(&self, event: PlaybackEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_reaches_every_subscriber() {
        let bus = PlaybackEventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.broadcast(PlaybackEvent::MainActionChanged(MainAction::Play));

        assert_eq!(
            first.try_recv().unwrap(),
            PlaybackEvent::MainActionChanged(MainAction::Play)
        );
        assert_eq!(
            second.try_recv().unwrap(),
            PlaybackEvent::MainActionChanged(MainAction::Play)
        );
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = PlaybackEventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.broadcast(PlaybackEvent::SessionChanged { package_name: None });

        assert_eq!(bus.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }
}
