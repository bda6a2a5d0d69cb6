//! Capability plugins and their registry.
//!
//! ```text
//!   page script                 native side
//!   -----------                 -----------
//!   window.swv.postMessage  ->  coordinator.on_message
//!                                 -> registry.dispatch_message
//!                                      -> plugin.on_message
//!                                           -> platform services
//! ```
//!
//! Plugins are selected by the `plugins.enabled` configuration list and
//! registered in list order.

pub mod dialog;
pub mod location;
pub mod playground;
pub mod push;
pub mod rating;
pub mod registry;
pub mod toast;
pub mod types;

use tracing::warn;

use crate::config::ShellConfig;
use crate::plugins::registry::PluginRegistry;
use crate::plugins::types::CapabilityPlugin;

/// Construct a built-in plugin by its canonical name.
pub fn build_plugin(name: &str) -> Option<Box<dyn CapabilityPlugin>> {
    match name {
        "Toast" => Some(Box::new(toast::ToastPlugin::new())),
        "Dialog" => Some(Box::new(dialog::DialogPlugin::new())),
        "Location" => Some(Box::new(location::LocationPlugin::new())),
        "Rating" => Some(Box::new(rating::RatingPlugin::new())),
        "Playground" => Some(Box::new(playground::PlaygroundPlugin::new())),
        "Push" => Some(Box::new(push::PushPlugin::new())),
        _ => None,
    }
}

/// Register every plugin named in `plugins.enabled`, in list order.
///
/// Unknown names are logged and skipped.
pub fn register_enabled(registry: &PluginRegistry, config: &ShellConfig) {
    for name in &config.enabled_plugins {
        match build_plugin(name) {
            Some(plugin) => registry.register(plugin),
            None => warn!(plugin = %name, "unknown plugin name in configuration, skipping"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_enabled_follows_list_order() {
        let config = ShellConfig::from_properties_str(
            "plugins.enabled = Push, Toast, NoSuchPlugin, Dialog\n",
        );
        let registry = PluginRegistry::new();
        register_enabled(&registry, &config);
        assert_eq!(
            registry.handle().plugin_names(),
            vec!["Push", "Toast", "Dialog"]
        );
    }

    #[test]
    fn test_build_plugin_is_case_sensitive() {
        assert!(build_plugin("Toast").is_some());
        assert!(build_plugin("toast").is_none());
    }
}
