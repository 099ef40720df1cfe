//! Icon lookup for custom actions.
//!
//! Kept out of the projection on purpose: resolving an icon may hit the
//! filesystem, so UI code calls [`resolve_icon`] when it is about to draw a
//! [`CustomActionDescriptor`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{error, warn};

use crate::errors::PlaybackError;
use crate::projection::{CustomActionDescriptor, IconRef};

/// A loaded icon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedIcon {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

/// Where icons come from.
pub trait IconCatalog {
    /// Looks up an icon in this application's own resources.
    fn local_icon(&self, icon: &IconRef) -> Result<Option<ResolvedIcon>, PlaybackError>;

    /// Looks up an icon in the resources of `package`.
    ///
    /// Fails with [`PlaybackError::UnknownPackage`] when the package's
    /// resources are not available at all.
    fn package_icon(
        &self,
        package: &str,
        icon: &IconRef,
    ) -> Result<Option<ResolvedIcon>, PlaybackError>;
}

/// Resolves the icon of a custom action, logging rather than returning
/// lookup failures.
pub fn resolve_icon<C: IconCatalog + ?Sized>(
    catalog: &C,
    descriptor: &CustomActionDescriptor,
) -> Option<ResolvedIcon> {
    let result = match descriptor.owning_package.as_deref() {
        Some(package) => catalog.package_icon(package, &descriptor.icon),
        None => catalog.local_icon(&descriptor.icon),
    };

    match result {
        Ok(Some(icon)) => Some(icon),
        Ok(None) => {
            warn!(
                action = %descriptor.action,
                icon = ?descriptor.icon,
                "No icon for custom action"
            );
            None
        }
        Err(e) => {
            error!(action = %descriptor.action, "Unable to resolve icon: {}", e);
            None
        }
    }
}

/// File-backed catalog.
///
/// Layout under the root directory:
/// - `local/<name>.png` for built-in icons,
/// - `packages/<package>/<resource id>.png` for package resources.
#[derive(Clone, Debug)]
pub struct DirectoryIconCatalog {
    root: PathBuf,
}

impl DirectoryIconCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_name(icon: &IconRef) -> String {
        match icon {
            IconRef::Builtin(builtin) => format!("{}.png", builtin.name()),
            IconRef::Resource(id) => format!("{}.png", id),
        }
    }

    fn load(path: PathBuf) -> Result<Option<ResolvedIcon>, PlaybackError> {
        match fs::read(&path) {
            Ok(data) => Ok(Some(ResolvedIcon { path, data })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl IconCatalog for DirectoryIconCatalog {
    fn local_icon(&self, icon: &IconRef) -> Result<Option<ResolvedIcon>, PlaybackError> {
        Self::load(self.root.join("local").join(Self::file_name(icon)))
    }

    fn package_icon(
        &self,
        package: &str,
        icon: &IconRef,
    ) -> Result<Option<ResolvedIcon>, PlaybackError> {
        // package names never contain path separators
        if package.is_empty() || package.contains(['/', '\\']) || package.starts_with('.') {
            return Err(PlaybackError::unknown_package(package));
        }
        let package_dir = self.root.join("packages").join(package);
        if !package_dir.is_dir() {
            return Err(PlaybackError::unknown_package(package));
        }
        Self::load(package_dir.join(Self::file_name(icon)))
    }
}
