//! Follows a simulated media session and prints what a playback bar would
//! show.
//!
//! Run with `cargo run -p pmoplayback --example now_playing`.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use pmoplayback::{
    ControllerInfo, MediaDescription, MediaMetadata, PlaybackAction, PlaybackConfig,
    PlaybackEvent, PlaybackStatus, PlaybackViewModel, QueueItem, Rating, RatingStyle,
    SessionSnapshot, SharedSession, TransportState, model::keys,
};
use tracing_subscriber::EnvFilter;

fn track(title: &str, status: PlaybackStatus, position_ms: u64) -> SessionSnapshot {
    let controller = ControllerInfo::new("org.example.radio");
    let controller = controller.with_rating_style(RatingStyle::Heart);
    let metadata = MediaMetadata::new()
        .with_text(keys::TITLE, title)
        .with_long(keys::DURATION, 180_000)
        .with_rating(keys::USER_RATING, Rating::Heart(false));
    let actions = [
        PlaybackAction::PlayPause,
        PlaybackAction::SkipToNext,
        PlaybackAction::SetRating,
    ];
    let transport = TransportState::new(status)
        .with_actions(actions)
        .with_position(Some(position_ms), Instant::now())
        .with_active_queue_item(1);
    let queue = vec![
        QueueItem::new(1, Some(MediaDescription::titled(title))),
        QueueItem::new(2, Some(MediaDescription::titled("Up next"))),
        QueueItem::new(3, None),
    ];
    SessionSnapshot::new(controller)
        .with_metadata(metadata)
        .with_transport(transport)
        .with_queue(queue)
}

fn main() -> Result<()> {
    let config = PlaybackConfig::load("")?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.min_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let first = track("Morning Show", PlaybackStatus::Buffering, 0);
    let session = Arc::new(SharedSession::new(first));

    let mut view_model = PlaybackViewModel::new(config);
    let events = view_model.subscribe();
    view_model.set_source(Some(session.clone()));

    let publisher = {
        let session = session.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            session.publish(track("Morning Show", PlaybackStatus::Playing, 0));
            thread::sleep(Duration::from_secs(2));
            session.publish(track("Morning Show", PlaybackStatus::Paused, 2_000));
        })
    };

    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        view_model.wait_for_update(Duration::from_millis(250));
        for event in events.try_iter() {
            match event {
                PlaybackEvent::MainActionChanged(action) => println!("main action: {action:?}"),
                PlaybackEvent::ProgressChanged {
                    progress,
                    max_progress,
                } => println!("progress: {progress:?} / {max_progress} ms"),
                PlaybackEvent::QueueChanged(queue) => {
                    let titles: Vec<_> = queue.iter().map(|item| item.title.as_str()).collect();
                    println!("queue: {titles:?}");
                }
                PlaybackEvent::CustomActionsChanged(actions) => {
                    println!("custom actions: {}", actions.len());
                }
                PlaybackEvent::SessionChanged { package_name } => {
                    println!("session: {package_name:?}");
                }
                PlaybackEvent::StateChanged(_) => {}
            }
        }
    }

    let _ = publisher.join();
    view_model.set_source(None);
    println!("final state: {:?}", view_model.state().main_action);
    Ok(())
}
