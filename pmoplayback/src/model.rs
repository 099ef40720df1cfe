//! Point-in-time view of a media session.
//!
//! These types describe what a session exposes (metadata, transport state,
//! queue and a couple of controller facts). They are plain values: a new
//! [`SessionSnapshot`] is built every time the session changes.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::actions::ActionSet;

/// Queue id reported when no queue item is active.
pub const UNKNOWN_QUEUE_ID: i64 = -1;

/// Playback status as reported by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaybackStatus {
    None,
    Stopped,
    Paused,
    Playing,
    FastForwarding,
    Rewinding,
    Buffering,
    Error,
    Connecting,
    SkippingToPrevious,
    SkippingToNext,
    SkippingToQueueItem,
    /// Raw status code this crate does not know about.
    Unknown(i32),
}

impl PlaybackStatus {
    /// Maps a platform status code to a [`PlaybackStatus`].
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => PlaybackStatus::None,
            1 => PlaybackStatus::Stopped,
            2 => PlaybackStatus::Paused,
            3 => PlaybackStatus::Playing,
            4 => PlaybackStatus::FastForwarding,
            5 => PlaybackStatus::Rewinding,
            6 => PlaybackStatus::Buffering,
            7 => PlaybackStatus::Error,
            8 => PlaybackStatus::Connecting,
            9 => PlaybackStatus::SkippingToPrevious,
            10 => PlaybackStatus::SkippingToNext,
            11 => PlaybackStatus::SkippingToQueueItem,
            other => PlaybackStatus::Unknown(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            PlaybackStatus::None => 0,
            PlaybackStatus::Stopped => 1,
            PlaybackStatus::Paused => 2,
            PlaybackStatus::Playing => 3,
            PlaybackStatus::FastForwarding => 4,
            PlaybackStatus::Rewinding => 5,
            PlaybackStatus::Buffering => 6,
            PlaybackStatus::Error => 7,
            PlaybackStatus::Connecting => 8,
            PlaybackStatus::SkippingToPrevious => 9,
            PlaybackStatus::SkippingToNext => 10,
            PlaybackStatus::SkippingToQueueItem => 11,
            PlaybackStatus::Unknown(code) => *code,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackStatus::None => "NONE",
            PlaybackStatus::Stopped => "STOPPED",
            PlaybackStatus::Paused => "PAUSED",
            PlaybackStatus::Playing => "PLAYING",
            PlaybackStatus::FastForwarding => "FAST_FORWARDING",
            PlaybackStatus::Rewinding => "REWINDING",
            PlaybackStatus::Buffering => "BUFFERING",
            PlaybackStatus::Error => "ERROR",
            PlaybackStatus::Connecting => "CONNECTING",
            PlaybackStatus::SkippingToPrevious => "SKIPPING_TO_PREVIOUS",
            PlaybackStatus::SkippingToNext => "SKIPPING_TO_NEXT",
            PlaybackStatus::SkippingToQueueItem => "SKIPPING_TO_QUEUE_ITEM",
            PlaybackStatus::Unknown(_) => "UNKNOWN",
        }
    }
}

/// Value attached to a custom action or sent along with a command.
#[derive(Clone, Debug, PartialEq)]
pub enum ExtraValue {
    Bool(bool),
    Long(i64),
    Text(String),
}

/// Opaque key/value payload carried by custom actions.
pub type Extras = BTreeMap<String, ExtraValue>;

/// Reads a boolean extra, falling back to `default` when the key is missing
/// or holds another type.
pub fn extra_bool(extras: Option<&Extras>, key: &str, default: bool) -> bool {
    match extras.and_then(|e| e.get(key)) {
        Some(ExtraValue::Bool(b)) => *b,
        _ => default,
    }
}

/// Rating scheme a controller accepts for `set_rating`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RatingStyle {
    #[default]
    None,
    Heart,
    ThumbUpDown,
    ThreeStars,
    FourStars,
    FiveStars,
    Percentage,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Rating {
    Heart(bool),
    ThumbUpDown(bool),
    Stars { max: u8, value: f32 },
    Percentage(f32),
    Unrated(RatingStyle),
}

impl Rating {
    /// True only for a rated heart rating holding a heart.
    pub fn has_heart(&self) -> bool {
        matches!(self, Rating::Heart(true))
    }

    pub fn style(&self) -> RatingStyle {
        match self {
            Rating::Heart(_) => RatingStyle::Heart,
            Rating::ThumbUpDown(_) => RatingStyle::ThumbUpDown,
            Rating::Stars { max: 3, .. } => RatingStyle::ThreeStars,
            Rating::Stars { max: 4, .. } => RatingStyle::FourStars,
            Rating::Stars { .. } => RatingStyle::FiveStars,
            Rating::Percentage(_) => RatingStyle::Percentage,
            Rating::Unrated(style) => *style,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MetadataValue {
    Long(i64),
    Text(String),
    Rating(Rating),
}

/// Well-known metadata keys.
pub mod keys {
    pub const DURATION: &str = "duration";
    pub const USER_RATING: &str = "user_rating";
    pub const TITLE: &str = "title";
    pub const ARTIST: &str = "artist";
    pub const ALBUM: &str = "album";
    pub const MEDIA_ID: &str = "media_id";
    pub const ALBUM_ART_URI: &str = "album_art_uri";
}

/// Metadata of the item currently loaded in the session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaMetadata {
    values: BTreeMap<String, MetadataValue>,
}

impl MediaMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: MetadataValue) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn with_long(self, key: &str, value: i64) -> Self {
        self.with(key, MetadataValue::Long(value))
    }

    pub fn with_text(self, key: &str, value: impl Into<String>) -> Self {
        self.with(key, MetadataValue::Text(value.into()))
    }

    pub fn with_rating(self, key: &str, rating: Rating) -> Self {
        self.with(key, MetadataValue::Rating(rating))
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.values.get(key)
    }

    /// Long value for `key`, 0 when missing or of another type.
    pub fn long(&self, key: &str) -> i64 {
        match self.values.get(key) {
            Some(MetadataValue::Long(v)) => *v,
            _ => 0,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(MetadataValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn rating(&self, key: &str) -> Option<&Rating> {
        match self.values.get(key) {
            Some(MetadataValue::Rating(r)) => Some(r),
            _ => None,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.long(keys::DURATION)
    }

    pub fn user_rating(&self) -> Option<&Rating> {
        self.rating(keys::USER_RATING)
    }

    pub fn title(&self) -> Option<&str> {
        self.text(keys::TITLE)
    }
}

/// A source-defined action reported in the transport state.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionCustomAction {
    pub action: String,
    pub name: String,
    /// Icon resource id inside the session owner's resources.
    pub icon: u32,
    pub extras: Extras,
}

/// Transport part of a snapshot: status, accepted actions and position.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportState {
    pub status: PlaybackStatus,
    pub actions: ActionSet,
    /// Reported position in milliseconds, `None` when unknown.
    pub position_ms: Option<u64>,
    pub speed: f32,
    /// When `position_ms` was last reported.
    pub updated_at: Instant,
    pub error_message: Option<String>,
    pub active_queue_item_id: i64,
    pub custom_actions: Vec<SessionCustomAction>,
}

impl TransportState {
    pub fn new(status: PlaybackStatus) -> Self {
        Self {
            status,
            actions: ActionSet::empty(),
            position_ms: Some(0),
            speed: 1.0,
            updated_at: Instant::now(),
            error_message: None,
            active_queue_item_id: UNKNOWN_QUEUE_ID,
            custom_actions: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: impl Into<ActionSet>) -> Self {
        self.actions = actions.into();
        self
    }

    pub fn with_position(mut self, position_ms: Option<u64>, updated_at: Instant) -> Self {
        self.position_ms = position_ms;
        self.updated_at = updated_at;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_active_queue_item(mut self, queue_id: i64) -> Self {
        self.active_queue_item_id = queue_id;
        self
    }

    pub fn with_custom_action(mut self, action: SessionCustomAction) -> Self {
        self.custom_actions.push(action);
        self
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}

/// Displayable part of a queue entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaDescription {
    pub media_id: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub icon_uri: Option<String>,
}

impl MediaDescription {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueueItem {
    pub queue_id: i64,
    pub description: Option<MediaDescription>,
}

impl QueueItem {
    pub fn new(queue_id: i64, description: Option<MediaDescription>) -> Self {
        Self {
            queue_id,
            description,
        }
    }
}

/// Facts about the controller a snapshot was read from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControllerInfo {
    /// Package owning the session; custom action icons live there.
    pub package_name: String,
    pub rating_style: RatingStyle,
}

impl ControllerInfo {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            rating_style: RatingStyle::None,
        }
    }

    pub fn with_rating_style(mut self, style: RatingStyle) -> Self {
        self.rating_style = style;
        self
    }
}

/// Everything the projector reads from a session at one point in time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSnapshot {
    pub controller: ControllerInfo,
    pub metadata: Option<MediaMetadata>,
    pub transport: Option<TransportState>,
    pub queue: Option<Vec<QueueItem>>,
}

impl SessionSnapshot {
    pub fn new(controller: ControllerInfo) -> Self {
        Self {
            controller,
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, metadata: MediaMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_transport(mut self, transport: TransportState) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_queue(mut self, queue: Vec<QueueItem>) -> Self {
        self.queue = Some(queue);
        self
    }
}
