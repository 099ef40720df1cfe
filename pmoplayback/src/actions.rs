//! Named transport capabilities and the set type used to test them.
//!
//! Media sessions advertise which transport commands they currently accept
//! as a bit field. Everything above this module works with
//! [`PlaybackAction`] values and [`ActionSet`] membership instead; the bit
//! layout only matters when converting from or to the platform
//! representation.

use std::fmt;

/// A transport command a media session may advertise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaybackAction {
    Stop,
    Pause,
    Play,
    Rewind,
    SkipToPrevious,
    SkipToNext,
    FastForward,
    SetRating,
    SeekTo,
    PlayPause,
    PlayFromMediaId,
    PlayFromSearch,
    SkipToQueueItem,
    PlayFromUri,
    Prepare,
    PrepareFromMediaId,
    PrepareFromSearch,
    PrepareFromUri,
    SetPlaybackSpeed,
}

impl PlaybackAction {
    pub const ALL: [PlaybackAction; 19] = [
        PlaybackAction::Stop,
        PlaybackAction::Pause,
        PlaybackAction::Play,
        PlaybackAction::Rewind,
        PlaybackAction::SkipToPrevious,
        PlaybackAction::SkipToNext,
        PlaybackAction::FastForward,
        PlaybackAction::SetRating,
        PlaybackAction::SeekTo,
        PlaybackAction::PlayPause,
        PlaybackAction::PlayFromMediaId,
        PlaybackAction::PlayFromSearch,
        PlaybackAction::SkipToQueueItem,
        PlaybackAction::PlayFromUri,
        PlaybackAction::Prepare,
        PlaybackAction::PrepareFromMediaId,
        PlaybackAction::PrepareFromSearch,
        PlaybackAction::PrepareFromUri,
        PlaybackAction::SetPlaybackSpeed,
    ];

    /// Platform flag for this action.
    pub const fn bit(self) -> u64 {
        match self {
            PlaybackAction::Stop => 1 << 0,
            PlaybackAction::Pause => 1 << 1,
            PlaybackAction::Play => 1 << 2,
            PlaybackAction::Rewind => 1 << 3,
            PlaybackAction::SkipToPrevious => 1 << 4,
            PlaybackAction::SkipToNext => 1 << 5,
            PlaybackAction::FastForward => 1 << 6,
            PlaybackAction::SetRating => 1 << 7,
            PlaybackAction::SeekTo => 1 << 8,
            PlaybackAction::PlayPause => 1 << 9,
            PlaybackAction::PlayFromMediaId => 1 << 10,
            PlaybackAction::PlayFromSearch => 1 << 11,
            PlaybackAction::SkipToQueueItem => 1 << 12,
            PlaybackAction::PlayFromUri => 1 << 13,
            PlaybackAction::Prepare => 1 << 14,
            PlaybackAction::PrepareFromMediaId => 1 << 15,
            PlaybackAction::PrepareFromSearch => 1 << 16,
            PlaybackAction::PrepareFromUri => 1 << 17,
            PlaybackAction::SetPlaybackSpeed => 1 << 22,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackAction::Stop => "STOP",
            PlaybackAction::Pause => "PAUSE",
            PlaybackAction::Play => "PLAY",
            PlaybackAction::Rewind => "REWIND",
            PlaybackAction::SkipToPrevious => "SKIP_TO_PREVIOUS",
            PlaybackAction::SkipToNext => "SKIP_TO_NEXT",
            PlaybackAction::FastForward => "FAST_FORWARD",
            PlaybackAction::SetRating => "SET_RATING",
            PlaybackAction::SeekTo => "SEEK_TO",
            PlaybackAction::PlayPause => "PLAY_PAUSE",
            PlaybackAction::PlayFromMediaId => "PLAY_FROM_MEDIA_ID",
            PlaybackAction::PlayFromSearch => "PLAY_FROM_SEARCH",
            PlaybackAction::SkipToQueueItem => "SKIP_TO_QUEUE_ITEM",
            PlaybackAction::PlayFromUri => "PLAY_FROM_URI",
            PlaybackAction::Prepare => "PREPARE",
            PlaybackAction::PrepareFromMediaId => "PREPARE_FROM_MEDIA_ID",
            PlaybackAction::PrepareFromSearch => "PREPARE_FROM_SEARCH",
            PlaybackAction::PrepareFromUri => "PREPARE_FROM_URI",
            PlaybackAction::SetPlaybackSpeed => "SET_PLAYBACK_SPEED",
        }
    }
}

impl fmt::Display for PlaybackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of [`PlaybackAction`]s currently accepted by a session.
///
/// Bits that do not correspond to a known action are kept so that
/// [`ActionSet::bits`] returns what [`ActionSet::from_bits`] was given, but
/// they are never reported by [`ActionSet::iter`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ActionSet(u64);

impl ActionSet {
    pub const fn empty() -> Self {
        ActionSet(0)
    }

    pub const fn from_bits(bits: u64) -> Self {
        ActionSet(bits)
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn contains(&self, action: PlaybackAction) -> bool {
        self.0 & action.bit() != 0
    }

    /// True if at least one of `actions` is in the set.
    pub fn contains_any(&self, actions: &[PlaybackAction]) -> bool {
        actions.iter().any(|a| self.contains(*a))
    }

    pub fn insert(&mut self, action: PlaybackAction) {
        self.0 |= action.bit();
    }

    pub fn remove(&mut self, action: PlaybackAction) {
        self.0 &= !action.bit();
    }

    pub fn with(mut self, action: PlaybackAction) -> Self {
        self.insert(action);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = PlaybackAction> + '_ {
        PlaybackAction::ALL
            .iter()
            .copied()
            .filter(move |a| self.contains(*a))
    }
}

impl FromIterator<PlaybackAction> for ActionSet {
    fn from_iter<I: IntoIterator<Item = PlaybackAction>>(iter: I) -> Self {
        let mut set = ActionSet::empty();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

impl<const N: usize> From<[PlaybackAction; N]> for ActionSet {
    fn from(actions: [PlaybackAction; N]) -> Self {
        actions.into_iter().collect()
    }
}

impl fmt::Debug for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
