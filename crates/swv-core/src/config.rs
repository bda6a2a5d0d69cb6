//! Shell configuration snapshot.
//!
//! Configuration is loaded exactly once at startup from a `key=value`
//! properties file and is immutable for the lifetime of the process. Every
//! consumer (plugins, router, coordinator) reads the same `Arc<ShellConfig>`
//! snapshot.
//!
//! A missing file or a missing key is never fatal: each key has a documented
//! default and absence only produces a `warn!`/`debug!` log line.
//!
//! # File format
//!
//! ```text
//! # comment lines start with '#'
//! app.url = https://app.example.com
//! feature.uploads = true
//! plugins.enabled = Toast, Dialog, Location
//! ```
//!
//! List values are comma-separated; surrounding whitespace is trimmed from
//! keys, values and list entries.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};
use url::Url;

/// How many tiers the resource-selection source sheet offers.
///
/// The upstream picker flow exists in two revisions; rather than guessing,
/// the tier choice is a configuration option (`picker.tiers`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerTiers {
    /// Single-tier flow: the photo library picker is presented directly.
    LibraryOnly,
    /// Three-tier flow: camera / photo library / file browser choice sheet.
    #[default]
    Full,
}

/// Immutable snapshot of all shell settings.
///
/// Constructed once at startup via [`ShellConfig::load`],
/// [`ShellConfig::from_properties_str`] or [`ShellConfig::default`], then
/// shared read-only behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    /// Debug mode: enables diagnostic demonstrations (toast demo, playground).
    pub debug_mode: bool,
    /// Primary application URL loaded into the web surface.
    pub app_url: String,
    /// Local fallback page shown when the device is offline.
    pub offline_url: String,
    /// Search URL prefix used by the surface's search affordance.
    pub search_url: String,
    /// Suffix appended to `app_url` when building share links.
    pub share_url_suffix: String,
    /// Hosts that must stay inside the surface even when external.
    pub external_url_exception_list: Vec<String>,
    /// Whether pull-to-refresh reloads the surface.
    pub pull_to_refresh_enabled: bool,
    /// Whether page-initiated resource selection (uploads) is allowed.
    pub uploads_enabled: bool,
    /// Whether a picker may return more than one resource.
    pub multiple_uploads_enabled: bool,
    /// Whether off-host navigations open in the platform browser.
    pub open_external_urls: bool,
    /// Names of capability plugins to register, in order.
    pub enabled_plugins: Vec<String>,
    /// Whether the diagnostic playground panel may be injected.
    pub playground_enabled: bool,
    /// Platform permissions to request at launch (e.g. `NOTIFICATIONS`).
    pub permissions_on_launch: Vec<String>,
    /// Picker source-sheet variant.
    pub picker_tiers: PickerTiers,

    /// Host component of `app_url`, used by the external-link rule.
    /// Empty when `app_url` does not parse.
    pub primary_host: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::from_properties(&HashMap::new())
    }
}

impl ShellConfig {
    /// Load the configuration from a properties file.
    ///
    /// A missing or unreadable file yields the documented defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_properties_str(&content),
            Err(err) => {
                warn!(path = %path.display(), %err, "configuration file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Parse the configuration from properties-file text.
    pub fn from_properties_str(content: &str) -> Self {
        let mut properties = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                properties.insert(key.trim().to_string(), value.trim().to_string());
            } else {
                debug!(line, "ignoring malformed configuration line");
            }
        }
        Self::from_properties(&properties)
    }

    fn from_properties(properties: &HashMap<String, String>) -> Self {
        let app_url = get_string(properties, "app.url", "https://example.com");
        let primary_host = Url::parse(&app_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        if primary_host.is_empty() {
            warn!(%app_url, "primary host could not be derived from app.url");
        }

        Self {
            debug_mode: get_bool(properties, "debug.mode", false),
            offline_url: get_string(properties, "offline.url", "offline.html"),
            search_url: get_string(properties, "search.url", "https://www.google.com/search?q="),
            share_url_suffix: get_string(properties, "share.url.suffix", "/?share="),
            external_url_exception_list: get_list(properties, "external.url.exception.list"),
            pull_to_refresh_enabled: get_bool(properties, "feature.pull.refresh", true),
            uploads_enabled: get_bool(properties, "feature.uploads", true),
            multiple_uploads_enabled: get_bool(properties, "feature.multiple.uploads", true),
            open_external_urls: get_bool(properties, "feature.open.external.urls", true),
            enabled_plugins: get_list(properties, "plugins.enabled"),
            playground_enabled: get_bool(properties, "plugins.playground.enabled", true),
            permissions_on_launch: get_list(properties, "permissions.on.launch"),
            picker_tiers: get_picker_tiers(properties),
            app_url,
            primary_host,
        }
    }

    /// The primary application URL, parsed.
    ///
    /// Returns `None` when `app.url` is not a valid URL; callers degrade to
    /// doing nothing in that case.
    pub fn app_url_parsed(&self) -> Option<Url> {
        Url::parse(&self.app_url).ok()
    }

    /// Whether the named plugin is enabled by configuration.
    pub fn plugin_enabled(&self, name: &str) -> bool {
        self.enabled_plugins.iter().any(|p| p == name)
    }
}

fn get_string(properties: &HashMap<String, String>, key: &str, default: &str) -> String {
    properties
        .get(key)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

fn get_bool(properties: &HashMap<String, String>, key: &str, default: bool) -> bool {
    match properties.get(key) {
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            other => {
                warn!(key, value = other, "unrecognized boolean value, using default");
                default
            }
        },
        None => default,
    }
}

fn get_list(properties: &HashMap<String, String>, key: &str) -> Vec<String> {
    match properties.get(key) {
        Some(value) if !value.is_empty() => value
            .split(',')
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn get_picker_tiers(properties: &HashMap<String, String>) -> PickerTiers {
    match properties.get("picker.tiers").map(String::as_str) {
        Some("single") => PickerTiers::LibraryOnly,
        Some("full") | None => PickerTiers::Full,
        Some(other) => {
            warn!(value = other, "unrecognized picker.tiers value, using full");
            PickerTiers::Full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShellConfig::default();
        assert!(!config.debug_mode);
        assert_eq!(config.app_url, "https://example.com");
        assert_eq!(config.primary_host, "example.com");
        assert_eq!(config.offline_url, "offline.html");
        assert!(config.uploads_enabled);
        assert!(config.multiple_uploads_enabled);
        assert!(config.open_external_urls);
        assert!(config.pull_to_refresh_enabled);
        assert!(config.playground_enabled);
        assert!(config.enabled_plugins.is_empty());
        assert!(config.external_url_exception_list.is_empty());
        assert_eq!(config.picker_tiers, PickerTiers::Full);
    }

    #[test]
    fn test_parse_properties() {
        let config = ShellConfig::from_properties_str(
            "# swv configuration\n\
             debug.mode = true\n\
             app.url = https://app.example.com\n\
             feature.uploads = false\n\
             plugins.enabled = Toast, Dialog , Location\n\
             external.url.exception.list = other.com\n\
             picker.tiers = single\n",
        );
        assert!(config.debug_mode);
        assert_eq!(config.app_url, "https://app.example.com");
        assert_eq!(config.primary_host, "app.example.com");
        assert!(!config.uploads_enabled);
        assert_eq!(config.enabled_plugins, vec!["Toast", "Dialog", "Location"]);
        assert_eq!(config.external_url_exception_list, vec!["other.com"]);
        assert_eq!(config.picker_tiers, PickerTiers::LibraryOnly);
    }

    #[test]
    fn test_comments_and_malformed_lines_ignored() {
        let config = ShellConfig::from_properties_str(
            "# app.url = https://commented.example.com\n\
             not a property line\n\
             \n\
             app.url = https://real.example.com\n",
        );
        assert_eq!(config.app_url, "https://real.example.com");
    }

    #[test]
    fn test_unparsable_app_url_yields_empty_host() {
        let config = ShellConfig::from_properties_str("app.url = not a url\n");
        assert_eq!(config.primary_host, "");
        assert!(config.app_url_parsed().is_none());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ShellConfig::load(Path::new("/nonexistent/swv.properties"));
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn test_bool_variants() {
        let config = ShellConfig::from_properties_str(
            "debug.mode = YES\nfeature.uploads = 0\nfeature.pull.refresh = garbage\n",
        );
        assert!(config.debug_mode);
        assert!(!config.uploads_enabled);
        // Unrecognized values keep the default.
        assert!(config.pull_to_refresh_enabled);
    }

    #[test]
    fn test_plugin_enabled_is_case_sensitive() {
        let config = ShellConfig::from_properties_str("plugins.enabled = Toast\n");
        assert!(config.plugin_enabled("Toast"));
        assert!(!config.plugin_enabled("toast"));
    }
}
