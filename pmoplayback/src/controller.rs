//! Command side of a session.
//!
//! The projector only decides which commands make sense; sending them is
//! the job of a [`TransportControls`] implementation supplied by the
//! session source. [`PlaybackController`] wraps an optional one so UI code
//! can issue commands without checking whether a session is present.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::model::{Extras, Rating, extra_bool};
use crate::projection::{ACTION_SET_RATING, EXTRA_SET_HEART};

/// External command sink of a media session.
pub trait TransportControls: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn stop(&self);
    fn skip_to_next(&self);
    fn skip_to_previous(&self);
    fn seek_to(&self, position_ms: u64);
    fn set_rating(&self, rating: Rating);
    fn send_custom_action(&self, action: &str, extras: Option<&Extras>);
    fn play_from_media_id(&self, media_id: &str);
    fn skip_to_queue_item(&self, queue_id: i64);
    fn prepare(&self);
}

/// Forwards commands to the current session, or does nothing without one.
#[derive(Clone, Default)]
pub struct PlaybackController {
    controls: Option<Arc<dyn TransportControls>>,
}

impl PlaybackController {
    pub fn new(controls: Option<Arc<dyn TransportControls>>) -> Self {
        Self { controls }
    }

    pub fn is_connected(&self) -> bool {
        self.controls.is_some()
    }

    fn with_controls(&self, command: &str, f: impl FnOnce(&dyn TransportControls)) {
        match self.controls.as_deref() {
            Some(controls) => f(controls),
            None => debug!(command, "No session, ignoring command"),
        }
    }

    pub fn play(&self) {
        self.with_controls("play", |c| c.play());
    }

    pub fn pause(&self) {
        self.with_controls("pause", |c| c.pause());
    }

    pub fn stop(&self) {
        self.with_controls("stop", |c| c.stop());
    }

    pub fn skip_to_next(&self) {
        self.with_controls("skip_to_next", |c| c.skip_to_next());
    }

    pub fn skip_to_previous(&self) {
        self.with_controls("skip_to_previous", |c| c.skip_to_previous());
    }

    pub fn seek_to(&self, position_ms: u64) {
        self.with_controls("seek_to", |c| c.seek_to(position_ms));
    }

    /// Sends a custom action.
    ///
    /// The built-in rating toggle is turned into a heart rating using the
    /// value carried in its extras; any other action is forwarded as is.
    pub fn do_custom_action(&self, action: &str, extras: Option<&Extras>) {
        self.with_controls("custom_action", |c| {
            if action == ACTION_SET_RATING {
                let set_heart = extra_bool(extras, EXTRA_SET_HEART, false);
                c.set_rating(Rating::Heart(set_heart));
            } else {
                c.send_custom_action(action, extras);
            }
        });
    }

    /// Starts playing the item with the given media id.
    pub fn play_item(&self, media_id: &str) {
        self.with_controls("play_item", |c| c.play_from_media_id(media_id));
    }

    /// Skips to a queue entry, using the id of a sanitised queue item.
    pub fn skip_to_queue_item(&self, queue_id: i64) {
        self.with_controls("skip_to_queue_item", |c| c.skip_to_queue_item(queue_id));
    }

    pub fn prepare(&self) {
        self.with_controls("prepare", |c| c.prepare());
    }
}

impl fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::ExtraValue;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TransportControls for Recorder {
        fn play(&self) {
            self.record("play".into());
        }
        fn pause(&self) {
            self.record("pause".into());
        }
        fn stop(&self) {
            self.record("stop".into());
        }
        fn skip_to_next(&self) {
            self.record("next".into());
        }
        fn skip_to_previous(&self) {
            self.record("previous".into());
        }
        fn seek_to(&self, position_ms: u64) {
            self.record(format!("seek {position_ms}"));
        }
        fn set_rating(&self, rating: Rating) {
            self.record(format!("rating {}", rating.has_heart()));
        }
        fn send_custom_action(&self, action: &str, extras: Option<&Extras>) {
            let count = extras.map_or(0, |e| e.len());
            self.record(format!("custom {action} {count}"));
        }
        fn play_from_media_id(&self, media_id: &str) {
            self.record(format!("item {media_id}"));
        }
        fn skip_to_queue_item(&self, queue_id: i64) {
            self.record(format!("queue {queue_id}"));
        }
        fn prepare(&self) {
            self.record("prepare".into());
        }
    }

    #[test]
    fn test_commands_without_session_are_ignored() {
        let controller = PlaybackController::default();
        assert!(!controller.is_connected());
        controller.play();
        controller.do_custom_action(ACTION_SET_RATING, None);
    }

    #[test]
    fn test_commands_are_forwarded() {
        let recorder = Arc::new(Recorder::default());
        let controller = PlaybackController::new(Some(recorder.clone()));

        controller.play();
        controller.pause();
        controller.skip_to_queue_item(4);
        controller.play_item("t9");
        controller.prepare();

        assert_eq!(
            recorder.calls(),
            vec!["play", "pause", "queue 4", "item t9", "prepare"]
        );
    }

    #[test]
    fn test_rating_action_becomes_heart_rating() {
        let recorder = Arc::new(Recorder::default());
        let controller = PlaybackController::new(Some(recorder.clone()));

        let mut extras = Extras::new();
        extras.insert(EXTRA_SET_HEART.into(), ExtraValue::Bool(true));
        controller.do_custom_action(ACTION_SET_RATING, Some(&extras));
        controller.do_custom_action(ACTION_SET_RATING, None);
        controller.do_custom_action("shuffle", Some(&extras));

        assert_eq!(
            recorder.calls(),
            vec!["rating true", "rating false", "custom shuffle 1"]
        );
    }
}
