use std::collections::HashMap;

use crate::{MediaSourceError, PackageCatalog, ResolvedComponent};

/// [`PackageCatalog`] backed by plain lists, for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct InMemoryPackageCatalog {
    music_activities: Vec<ResolvedComponent>,
    media_browser_services: Vec<ResolvedComponent>,
    labels: HashMap<String, String>,
}

impl InMemoryPackageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_music_activity(mut self, package: &str, label: &str) -> Self {
        let component = ResolvedComponent::new(package, format!("{package}.MainActivity"));
        self.music_activities.push(component);
        self.labels.insert(package.to_string(), label.to_string());
        self
    }

    pub fn with_media_browser_service(mut self, package: &str, label: &str) -> Self {
        let component = ResolvedComponent::new(package, format!("{package}.BrowserService"));
        self.media_browser_services.push(component);
        self.labels.insert(package.to_string(), label.to_string());
        self
    }

    /// Adds a component without registering a label for its package.
    pub fn with_unlabelled_service(mut self, component: ResolvedComponent) -> Self {
        self.media_browser_services.push(component);
        self
    }
}

impl PackageCatalog for InMemoryPackageCatalog {
    fn music_activities(&self) -> Result<Vec<ResolvedComponent>, MediaSourceError> {
        Ok(self.music_activities.clone())
    }

    fn media_browser_services(&self) -> Result<Vec<ResolvedComponent>, MediaSourceError> {
        Ok(self.media_browser_services.clone())
    }

    fn application_label(&self, package_name: &str) -> Option<String> {
        self.labels.get(package_name).cloned()
    }
}
