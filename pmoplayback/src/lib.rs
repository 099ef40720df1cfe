//! # PMOPlayback
//!
//! Turns media session snapshots into the state a playback UI displays.
//!
//! - [`projection`]: the pure part. [`project`] derives a [`PlaybackView`]
//!   (main action, progress, skip availability, sanitised queue, custom
//!   actions...) from a [`SessionSnapshot`], or the "no session" default
//!   from `None`.
//! - [`PlaybackViewModel`]: follows a switchable [`SessionSource`], keeps the
//!   view up to date, samples progress while playing and publishes
//!   [`PlaybackEvent`]s.
//! - [`PlaybackController`]: forwards UI commands to the session's
//!   [`TransportControls`].
//! - [`icons`]: deferred icon lookup for [`CustomActionDescriptor`]s.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use pmoplayback::{
//!     ActionSet, ControllerInfo, MainAction, PlaybackAction, PlaybackStatus,
//!     PlaybackViewModel, SessionSnapshot, SharedSession, TransportState,
//! };
//!
//! let session = Arc::new(SharedSession::new(
//!     SessionSnapshot::new(ControllerInfo::new("org.example.player")).with_transport(
//!         TransportState::new(PlaybackStatus::Paused)
//!             .with_actions(ActionSet::from([PlaybackAction::Play])),
//!     ),
//! ));
//!
//! let mut view_model = PlaybackViewModel::default();
//! view_model.set_source(Some(session.clone()));
//! assert_eq!(view_model.state().main_action, MainAction::Play);
//! ```

mod events;
mod progress;
mod source;

pub mod actions;
pub mod config;
pub mod controller;
pub mod errors;
pub mod icons;
pub mod model;
pub mod projection;
pub mod view_model;

pub use actions::{ActionSet, PlaybackAction};
pub use config::PlaybackConfig;
pub use controller::{PlaybackController, TransportControls};
pub use errors::PlaybackError;
pub use events::PlaybackEvent;
pub use icons::{DirectoryIconCatalog, IconCatalog, ResolvedIcon, resolve_icon};
pub use model::{
    ControllerInfo, ExtraValue, Extras, MediaDescription, MediaMetadata, MetadataValue,
    PlaybackStatus, QueueItem, Rating, RatingStyle, SessionCustomAction, SessionSnapshot,
    TransportState, UNKNOWN_QUEUE_ID,
};
pub use projection::{
    ACTION_SET_RATING, BuiltinIcon, CustomActionDescriptor, EXTRA_SET_HEART, IconRef, MainAction,
    MediaItemMetadata, PlaybackView, Progress, project, project_at,
};
pub use source::{SessionSource, SharedSession, SnapshotSink, Subscription};
pub use view_model::PlaybackViewModel;
