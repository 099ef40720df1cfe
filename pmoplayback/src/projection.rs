//! Pure derivation of UI playback state from a session snapshot.
//!
//! Every field of [`PlaybackView`] is a function of the latest
//! [`SessionSnapshot`] only. Missing upstream data never fails the
//! projection; each field falls back to its documented default and
//! unrecognised statuses are logged and treated as [`MainAction::Disabled`].

use std::time::Instant;

use tracing::warn;

use crate::actions::PlaybackAction;
use crate::model::{
    ExtraValue, Extras, MediaMetadata, PlaybackStatus, QueueItem, RatingStyle, SessionSnapshot,
    TransportState, UNKNOWN_QUEUE_ID, keys,
};

/// Custom action id of the built-in heart rating toggle.
pub const ACTION_SET_RATING: &str = "pmoplayback.ACTION_SET_RATING";
/// Boolean extra carrying the heart value the rating action will set.
pub const EXTRA_SET_HEART: &str = "pmoplayback.EXTRA_SET_HEART";

/// The single primary transport button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MainAction {
    /// The source can't play media at this time.
    #[default]
    Disabled,
    Play,
    Stop,
    Pause,
}

/// Playback position in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Progress {
    /// The session does not know its position.
    Unknown,
    Position(u64),
}

impl Default for Progress {
    fn default() -> Self {
        Progress::Position(0)
    }
}

impl Progress {
    pub fn as_millis(&self) -> Option<u64> {
        match self {
            Progress::Unknown => None,
            Progress::Position(ms) => Some(*ms),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinIcon {
    HeartFilled,
    HeartEmpty,
}

impl BuiltinIcon {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinIcon::HeartFilled => "heart_filled",
            BuiltinIcon::HeartEmpty => "heart_empty",
        }
    }
}

/// Reference to an icon, resolved later against a resource set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IconRef {
    /// One of this crate's own icons.
    Builtin(BuiltinIcon),
    /// Resource id inside some package's resources.
    Resource(u32),
}

/// A custom action ready for display.
///
/// Icon lookup is deferred to [`crate::icons::resolve_icon`]; when
/// `owning_package` is `None` the local icon set is used.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomActionDescriptor {
    pub icon: IconRef,
    pub owning_package: Option<String>,
    pub action: String,
    pub extras: Extras,
}

/// Displayable media item: either a sanitised queue entry or the metadata
/// of the current item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaItemMetadata {
    pub queue_id: Option<i64>,
    pub media_id: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub album_art_uri: Option<String>,
}

impl MediaItemMetadata {
    /// Wraps a queue entry, or `None` if it has no description or title.
    pub fn from_queue_item(item: &QueueItem) -> Option<Self> {
        let description = item.description.as_ref()?;
        let title = description.title.as_deref().filter(|t| !t.is_empty())?;
        Some(Self {
            queue_id: Some(item.queue_id),
            media_id: description.media_id.clone(),
            title: title.to_string(),
            subtitle: description.subtitle.clone(),
            album_art_uri: description.icon_uri.clone(),
        })
    }

    pub fn from_metadata(metadata: &MediaMetadata) -> Self {
        Self {
            queue_id: None,
            media_id: metadata.text(keys::MEDIA_ID).map(str::to_string),
            title: metadata.title().unwrap_or_default().to_string(),
            subtitle: metadata.text(keys::ARTIST).map(str::to_string),
            album_art_uri: metadata.text(keys::ALBUM_ART_URI).map(str::to_string),
        }
    }
}

/// UI-facing state derived from one snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackView {
    pub main_action: MainAction,
    pub progress: Progress,
    pub max_progress: u64,
    pub is_playing: bool,
    pub is_buffering: bool,
    pub skip_next_enabled: bool,
    pub skip_previous_enabled: bool,
    pub error_message: Option<String>,
    pub active_queue_item_id: i64,
    pub queue: Vec<MediaItemMetadata>,
    pub has_queue: bool,
    pub custom_actions: Vec<CustomActionDescriptor>,
    pub metadata: Option<MediaItemMetadata>,
    pub package_name: Option<String>,
}

impl Default for PlaybackView {
    /// The "no session" state.
    fn default() -> Self {
        Self {
            main_action: MainAction::Disabled,
            progress: Progress::Position(0),
            max_progress: 0,
            is_playing: false,
            is_buffering: false,
            skip_next_enabled: false,
            skip_previous_enabled: false,
            error_message: None,
            active_queue_item_id: UNKNOWN_QUEUE_ID,
            queue: Vec::new(),
            has_queue: false,
            custom_actions: Vec::new(),
            metadata: None,
            package_name: None,
        }
    }
}

/// Projects a snapshot using the current instant for progress sampling.
pub fn project(snapshot: Option<&SessionSnapshot>) -> PlaybackView {
    project_at(snapshot, Instant::now())
}

/// Projects a snapshot, sampling progress as of `now`.
pub fn project_at(snapshot: Option<&SessionSnapshot>, now: Instant) -> PlaybackView {
    let Some(snapshot) = snapshot else {
        return PlaybackView::default();
    };

    let transport = snapshot.transport.as_ref();
    let metadata = snapshot.metadata.as_ref();
    let max_progress = max_progress(metadata);
    let accepts = |action| transport.is_some_and(|t| t.actions.contains(action));

    PlaybackView {
        main_action: main_action(transport),
        progress: sample_progress(transport, max_progress, now),
        max_progress,
        is_playing: transport.is_some_and(|t| t.status == PlaybackStatus::Playing),
        is_buffering: transport.is_some_and(|t| t.status == PlaybackStatus::Buffering),
        skip_next_enabled: accepts(PlaybackAction::SkipToNext),
        skip_previous_enabled: accepts(PlaybackAction::SkipToPrevious),
        error_message: transport.and_then(|t| t.error_message.clone()),
        active_queue_item_id: transport.map_or(UNKNOWN_QUEUE_ID, |t| t.active_queue_item_id),
        queue: sanitize_queue(snapshot.queue.as_deref()),
        has_queue: snapshot.queue.as_ref().is_some_and(|q| !q.is_empty()),
        custom_actions: custom_actions(snapshot),
        metadata: metadata.map(MediaItemMetadata::from_metadata),
        package_name: Some(snapshot.controller.package_name.clone()),
    }
}

/// Main action for a transport state.
///
/// Active statuses map to whichever of pause or stop the session accepts,
/// idle statuses to play. Errors and unknown statuses disable the button.
pub fn main_action(transport: Option<&TransportState>) -> MainAction {
    let Some(transport) = transport else {
        return MainAction::Disabled;
    };

    let pause_actions = [PlaybackAction::Pause, PlaybackAction::PlayPause];
    let stop_action = if transport.actions.contains_any(&pause_actions) {
        MainAction::Pause
    } else if transport.actions.contains(PlaybackAction::Stop) {
        MainAction::Stop
    } else {
        MainAction::Disabled
    };

    match transport.status {
        PlaybackStatus::Playing
        | PlaybackStatus::Buffering
        | PlaybackStatus::Connecting
        | PlaybackStatus::FastForwarding
        | PlaybackStatus::Rewinding
        | PlaybackStatus::SkippingToNext
        | PlaybackStatus::SkippingToPrevious
        | PlaybackStatus::SkippingToQueueItem => stop_action,
        PlaybackStatus::Stopped | PlaybackStatus::Paused | PlaybackStatus::None => MainAction::Play,
        PlaybackStatus::Error => MainAction::Disabled,
        PlaybackStatus::Unknown(code) => {
            warn!(code, "Unknown playback status");
            MainAction::Disabled
        }
    }
}

/// Duration of the current item in milliseconds, 0 without metadata.
pub fn max_progress(metadata: Option<&MediaMetadata>) -> u64 {
    metadata.map_or(0, |m| m.duration_ms().max(0) as u64)
}

/// Position of the session as of `now`, clamped to `[0, max_progress]`.
///
/// While playing, the reported position is advanced by the time elapsed
/// since it was reported, scaled by the playback speed. Otherwise the last
/// reported position is held.
pub fn sample_progress(
    transport: Option<&TransportState>,
    max_progress: u64,
    now: Instant,
) -> Progress {
    let Some(transport) = transport else {
        return Progress::Position(0);
    };
    let Some(position) = transport.position_ms else {
        return Progress::Unknown;
    };

    let mut value = position as f64;
    if transport.is_playing() {
        let elapsed = now.saturating_duration_since(transport.updated_at);
        value += elapsed.as_millis() as f64 * f64::from(transport.speed);
    }

    // float to int casts saturate, negative speeds end at 0
    Progress::Position((value.max(0.0) as u64).min(max_progress))
}

/// Keeps queue entries that have a description with a non-empty title.
pub fn sanitize_queue(queue: Option<&[QueueItem]>) -> Vec<MediaItemMetadata> {
    queue
        .unwrap_or_default()
        .iter()
        .filter_map(MediaItemMetadata::from_queue_item)
        .collect()
}

/// Custom actions to display: the rating toggle first when eligible, then
/// the session's own actions in reported order.
pub fn custom_actions(snapshot: &SessionSnapshot) -> Vec<CustomActionDescriptor> {
    let Some(transport) = snapshot.transport.as_ref() else {
        return Vec::new();
    };

    let mut actions = Vec::with_capacity(transport.custom_actions.len() + 1);
    actions.extend(rating_action(snapshot));
    for action in &transport.custom_actions {
        actions.push(CustomActionDescriptor {
            icon: IconRef::Resource(action.icon),
            owning_package: Some(snapshot.controller.package_name.clone()),
            action: action.action.clone(),
            extras: action.extras.clone(),
        });
    }
    actions
}

/// Heart toggle for sessions that accept heart ratings.
///
/// The extras carry the opposite of the current heart state so invoking the
/// action flips it.
pub fn rating_action(snapshot: &SessionSnapshot) -> Option<CustomActionDescriptor> {
    let transport = snapshot.transport.as_ref()?;
    if !transport.actions.contains(PlaybackAction::SetRating) {
        return None;
    }
    if snapshot.controller.rating_style != RatingStyle::Heart {
        return None;
    }

    let has_heart = snapshot
        .metadata
        .as_ref()
        .and_then(|m| m.user_rating())
        .is_some_and(|r| r.has_heart());

    let icon = if has_heart {
        BuiltinIcon::HeartFilled
    } else {
        BuiltinIcon::HeartEmpty
    };
    let mut extras = Extras::new();
    extras.insert(EXTRA_SET_HEART.to_string(), ExtraValue::Bool(!has_heart));

    Some(CustomActionDescriptor {
        icon: IconRef::Builtin(icon),
        owning_package: None,
        action: ACTION_SET_RATING.to_string(),
        extras,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::actions::ActionSet;
    use crate::model::{ControllerInfo, MediaDescription, Rating, SessionCustomAction};

    const PACKAGE: &str = "org.example.player";

    fn transport(status: PlaybackStatus, actions: &[PlaybackAction]) -> TransportState {
        let actions: ActionSet = actions.iter().copied().collect();
        TransportState::new(status).with_actions(actions)
    }

    #[test]
    fn test_main_action_without_transport_is_disabled() {
        assert_eq!(main_action(None), MainAction::Disabled);
    }

    #[test]
    fn test_main_action_active_statuses_use_stop_action() {
        let active = [
            PlaybackStatus::Playing,
            PlaybackStatus::Buffering,
            PlaybackStatus::Connecting,
            PlaybackStatus::FastForwarding,
            PlaybackStatus::Rewinding,
            PlaybackStatus::SkippingToNext,
            PlaybackStatus::SkippingToPrevious,
            PlaybackStatus::SkippingToQueueItem,
        ];
        for status in active {
            let pause = transport(status, &[PlaybackAction::Pause, PlaybackAction::Stop]);
            assert_eq!(main_action(Some(&pause)), MainAction::Pause, "{status:?}");

            let play_pause = transport(status, &[PlaybackAction::PlayPause]);
            assert_eq!(main_action(Some(&play_pause)), MainAction::Pause);

            let stop = transport(status, &[PlaybackAction::Stop]);
            assert_eq!(main_action(Some(&stop)), MainAction::Stop);

            let none = transport(status, &[PlaybackAction::SkipToNext]);
            assert_eq!(main_action(Some(&none)), MainAction::Disabled);
        }
    }

    #[test]
    fn test_main_action_idle_statuses_play() {
        for status in [
            PlaybackStatus::Stopped,
            PlaybackStatus::Paused,
            PlaybackStatus::None,
        ] {
            assert_eq!(main_action(Some(&transport(status, &[]))), MainAction::Play);
        }
    }

    #[test]
    fn test_main_action_error_and_unknown_disabled() {
        let error = transport(PlaybackStatus::Error, &[PlaybackAction::Pause]);
        assert_eq!(main_action(Some(&error)), MainAction::Disabled);

        let unknown = transport(PlaybackStatus::Unknown(99), &[PlaybackAction::Pause]);
        assert_eq!(main_action(Some(&unknown)), MainAction::Disabled);
    }

    #[test]
    fn test_progress_holds_position_when_not_playing() {
        let reported = Instant::now();
        let state = TransportState::new(PlaybackStatus::Paused)
            .with_position(Some(30_000), reported);
        let later = reported + Duration::from_secs(10);
        assert_eq!(
            sample_progress(Some(&state), 100_000, later),
            Progress::Position(30_000)
        );
    }

    #[test]
    fn test_progress_advances_while_playing() {
        let reported = Instant::now();
        let state = TransportState::new(PlaybackStatus::Playing)
            .with_position(Some(30_000), reported)
            .with_speed(2.0);
        let later = reported + Duration::from_millis(1_500);
        assert_eq!(
            sample_progress(Some(&state), 100_000, later),
            Progress::Position(33_000)
        );

        let much_later = reported + Duration::from_secs(3600);
        assert_eq!(
            sample_progress(Some(&state), 100_000, much_later),
            Progress::Position(100_000)
        );
    }

    #[test]
    fn test_progress_defaults() {
        assert_eq!(
            sample_progress(None, 100_000, Instant::now()),
            Progress::Position(0)
        );
        let unknown = TransportState::new(PlaybackStatus::Playing)
            .with_position(None, Instant::now());
        assert_eq!(
            sample_progress(Some(&unknown), 100_000, Instant::now()),
            Progress::Unknown
        );
    }

    #[test]
    fn test_sanitize_queue_filters_and_keeps_order() {
        let queue = vec![
            QueueItem::new(1, Some(MediaDescription::titled("First"))),
            QueueItem::new(2, None),
            QueueItem::new(3, Some(MediaDescription::default())),
            QueueItem::new(4, Some(MediaDescription::titled(""))),
            QueueItem::new(5, Some(MediaDescription::titled("Fifth"))),
        ];
        let sanitized = sanitize_queue(Some(&queue));
        let ids: Vec<_> = sanitized.iter().map(|i| i.queue_id).collect();
        assert_eq!(ids, vec![Some(1), Some(5)]);
        assert_eq!(sanitized[1].title, "Fifth");
        assert!(sanitize_queue(None).is_empty());
    }

    fn rated_snapshot(style: RatingStyle, rating: Option<Rating>) -> SessionSnapshot {
        let mut metadata = MediaMetadata::new().with_long(keys::DURATION, 1000);
        if let Some(rating) = rating {
            metadata = metadata.with_rating(keys::USER_RATING, rating);
        }
        let controller = ControllerInfo::new(PACKAGE).with_rating_style(style);
        let playing = transport(PlaybackStatus::Playing, &[PlaybackAction::SetRating]);
        SessionSnapshot::new(controller)
            .with_metadata(metadata)
            .with_transport(playing)
    }

    #[test]
    fn test_rating_action_toggles_heart() {
        let snapshot = rated_snapshot(RatingStyle::Heart, Some(Rating::Heart(true)));
        let action = rating_action(&snapshot).unwrap();
        assert_eq!(action.icon, IconRef::Builtin(BuiltinIcon::HeartFilled));
        assert_eq!(action.owning_package, None);
        assert_eq!(action.action, ACTION_SET_RATING);
        let toggle = action.extras.get(EXTRA_SET_HEART);
        assert_eq!(toggle, Some(&ExtraValue::Bool(false)));

        let snapshot = rated_snapshot(RatingStyle::Heart, None);
        let action = rating_action(&snapshot).unwrap();
        assert_eq!(action.icon, IconRef::Builtin(BuiltinIcon::HeartEmpty));
        let toggle = action.extras.get(EXTRA_SET_HEART);
        assert_eq!(toggle, Some(&ExtraValue::Bool(true)));
    }

    #[test]
    fn test_rating_action_requires_heart_style_and_action() {
        let snapshot = rated_snapshot(RatingStyle::FiveStars, Some(Rating::Heart(true)));
        assert!(rating_action(&snapshot).is_none());

        let mut snapshot = rated_snapshot(RatingStyle::Heart, None);
        if let Some(t) = snapshot.transport.as_mut() {
            t.actions = ActionSet::empty();
        }
        assert!(rating_action(&snapshot).is_none());
    }

    #[test]
    fn test_custom_actions_rating_first_then_session_actions() {
        let mut extras = Extras::new();
        extras.insert("mode".into(), ExtraValue::Text("shuffle".into()));
        let mut snapshot = rated_snapshot(RatingStyle::Heart, Some(Rating::Heart(false)));
        if let Some(t) = snapshot.transport.as_mut() {
            t.custom_actions.push(SessionCustomAction {
                action: "shuffle".into(),
                name: "Shuffle".into(),
                icon: 17,
                extras: extras.clone(),
            });
        }

        let actions = custom_actions(&snapshot);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].action, ACTION_SET_RATING);
        assert_eq!(actions[1].action, "shuffle");
        assert_eq!(actions[1].icon, IconRef::Resource(17));
        assert_eq!(actions[1].owning_package.as_deref(), Some(PACKAGE));
        assert_eq!(actions[1].extras, extras);
    }

    #[test]
    fn test_project_absent_session_is_default() {
        let view = project(None);
        assert_eq!(view, PlaybackView::default());
        assert_eq!(view.main_action, MainAction::Disabled);
        assert!(view.queue.is_empty());
        assert!(view.custom_actions.is_empty());
    }

    #[test]
    fn test_project_without_transport() {
        let snapshot = SessionSnapshot::new(ControllerInfo::new(PACKAGE))
            .with_metadata(MediaMetadata::new().with_long(keys::DURATION, 5000));
        let view = project(Some(&snapshot));
        assert_eq!(view.main_action, MainAction::Disabled);
        assert_eq!(view.progress, Progress::Position(0));
        assert_eq!(view.max_progress, 5000);
        assert_eq!(view.active_queue_item_id, UNKNOWN_QUEUE_ID);
        assert!(!view.has_queue);
    }
}
