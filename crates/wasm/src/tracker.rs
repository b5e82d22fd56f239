//! Active-section tracking for the table of contents.
//!
//! The browser reports visibility changes of `section[data-heading-id]`
//! elements; the tracker decides which table-of-contents entry carries the
//! active marker. The first registered section that is currently visible
//! wins, so the answer does not depend on the order events arrive in.

use serde::Deserialize;
use thiserror::Error;

/// Default fraction of a section that must be visible to count.
pub const DEFAULT_THRESHOLD: f64 = 0.9;
/// Default class toggled on the active entry.
pub const DEFAULT_ACTIVE_CLASS: &str = "active";

/// Presentation side of the tracker.
pub trait SectionView {
    /// Moves the active marker from `previous` (if any) to `next`.
    fn move_marker(&mut self, previous: Option<&str>, next: &str);
}

/// Rejected tracker settings.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// `IntersectionObserver` only accepts thresholds in `0..=1`.
    #[error("threshold must be between 0 and 1, got {0}")]
    Threshold(f64),
    /// The class toggled on the active entry must be a single token.
    #[error("activeClass must be a non-empty class name, got {0:?}")]
    ActiveClass(String),
}

/// Tracker settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerConfig {
    /// Visibility ratio the observer should report at.
    pub threshold: f64,
    /// Class name the view toggles.
    pub active_class: String,
}

impl TrackerConfig {
    /// Checks the settings before they reach the browser.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Threshold(self.threshold));
        }
        if self.active_class.is_empty() || self.active_class.contains(char::is_whitespace) {
            return Err(ConfigError::ActiveClass(self.active_class.clone()));
        }
        Ok(())
    }
}

/// Builds `[name="value"]`, escaping quotes and backslashes in `value`.
pub fn attribute_selector(name: &str, value: &str) -> String {
    let mut selector = format!("[{name}=\"");
    for ch in value.chars() {
        if matches!(ch, '"' | '\\') {
            selector.push('\\');
        }
        selector.push(ch);
    }
    selector.push_str("\"]");
    selector
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            active_class: DEFAULT_ACTIVE_CLASS.to_string(),
        }
    }
}

/// Registration-ordered visibility flags plus the active section.
#[derive(Debug)]
pub struct ActiveSectionTracker<V> {
    sections: Vec<(String, bool)>,
    active: Option<usize>,
    config: TrackerConfig,
    view: V,
}

impl<V: SectionView> ActiveSectionTracker<V> {
    /// Registers `ids` in order. Repeated ids keep their first position.
    pub fn new<I, S>(ids: I, view: V, config: TrackerConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sections: Vec<(String, bool)> = Vec::new();
        for id in ids {
            let id = id.into();
            if !sections.iter().any(|(known, _)| *known == id) {
                sections.push((id, false));
            }
        }
        Self {
            sections,
            active: None,
            config,
            view,
        }
    }

    /// Records a visibility change and moves the marker if the active section changed.
    ///
    /// Unknown ids are ignored. When nothing is visible the marker stays where
    /// it was. Returns whether the view was updated.
    pub fn observe(&mut self, id: &str, intersecting: bool) -> bool {
        let Some(slot) = self.sections.iter_mut().find(|(known, _)| known == id) else {
            log::debug!("ignoring visibility change for unregistered section {id}");
            return false;
        };
        slot.1 = intersecting;

        let Some(next) = self.sections.iter().position(|(_, visible)| *visible) else {
            return false;
        };
        if self.active == Some(next) {
            return false;
        }
        let previous = self.active.map(|index| self.sections[index].0.as_str());
        self.view.move_marker(previous, &self.sections[next].0);
        self.active = Some(next);
        true
    }

    /// Id of the section holding the marker.
    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|index| self.sections[index].0.as_str())
    }

    /// Registered ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(id, _)| id.as_str())
    }

    /// Whether no section is registered.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Settings the tracker was built with.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The view receiving marker moves.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Forgets every section; later events are ignored.
    pub fn clear(&mut self) {
        self.sections.clear();
        self.active = None;
    }
}
