//! # PMOMediaSources
//!
//! Lists every media source the user can pick from: applications exposing
//! a media browser service and applications declaring a music activity.
//! The package database itself is behind the [`PackageCatalog`] trait.
//!
//! ```
//! use pmomediasources::{InMemoryPackageCatalog, MediaSourcesManager};
//!
//! let catalog = InMemoryPackageCatalog::new()
//!     .with_media_browser_service("org.example.radio", "Radio")
//!     .with_music_activity("org.example.player", "Player");
//!
//! let manager = MediaSourcesManager::new(catalog);
//! let names: Vec<_> = manager
//!     .available_media_sources()
//!     .into_iter()
//!     .map(|source| source.name)
//!     .collect();
//! assert_eq!(names, vec!["Player", "Radio"]);
//! ```

mod catalog;

use std::cmp::Ordering;
use std::collections::HashSet;

use thiserror::Error;
use tracing::warn;

pub use catalog::InMemoryPackageCatalog;

#[derive(Error, Debug)]
pub enum MediaSourceError {
    #[error("Package query failed: {0}")]
    QueryFailed(String),
}

/// An activity or service matched by a catalog query.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedComponent {
    /// `None` when the platform could not tell which package owns it.
    pub package_name: Option<String>,
    pub class_name: String,
}

impl ResolvedComponent {
    pub fn new(package_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            package_name: Some(package_name.into()),
            class_name: class_name.into(),
        }
    }
}

/// Read access to the installed packages.
pub trait PackageCatalog {
    /// Activities declaring the music application category.
    fn music_activities(&self) -> Result<Vec<ResolvedComponent>, MediaSourceError>;

    /// Services implementing the media browser interface.
    fn media_browser_services(&self) -> Result<Vec<ResolvedComponent>, MediaSourceError>;

    /// User visible label of a package.
    fn application_label(&self, package_name: &str) -> Option<String>;
}

/// A selectable media source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaSource {
    pub package_name: String,
    pub name: String,
}

pub struct MediaSourcesManager<C: PackageCatalog> {
    catalog: C,
}

impl<C: PackageCatalog> MediaSourcesManager<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// All available media sources in alphabetical order.
    ///
    /// A failing catalog query is logged and yields an empty list.
    pub fn available_media_sources(&self) -> Vec<MediaSource> {
        match self.try_available_media_sources() {
            Ok(sources) => sources,
            Err(e) => {
                warn!("Unable to list media sources: {}", e);
                Vec::new()
            }
        }
    }

    /// Same as [`Self::available_media_sources`] but reports query failures.
    pub fn try_available_media_sources(&self) -> Result<Vec<MediaSource>, MediaSourceError> {
        let mut sources: Vec<MediaSource> = self
            .package_names()?
            .into_iter()
            .filter_map(|package_name| match self.catalog.application_label(&package_name) {
                Some(name) => Some(MediaSource { package_name, name }),
                None => {
                    warn!(package = %package_name, "Found media source without name");
                    None
                }
            })
            .collect();

        sources.sort_by(by_name);
        Ok(sources)
    }

    /// Packages of every media browser service and music activity.
    fn package_names(&self) -> Result<HashSet<String>, MediaSourceError> {
        let services = self.catalog.media_browser_services()?;
        let activities = self.catalog.music_activities()?;

        Ok(services
            .into_iter()
            .chain(activities)
            .filter_map(|component| component.package_name)
            .collect())
    }
}

/// Alphabetical by label, ties broken by package name.
fn by_name(a: &MediaSource, b: &MediaSource) -> Ordering {
    let key = (&a.name, &a.package_name);
    key.cmp(&(&b.name, &b.package_name))
}
