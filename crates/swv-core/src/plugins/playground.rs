//! Playground diagnostics panel.
//!
//! Debug-only helper that injects a floating panel into the page listing
//! the registered plugins, and exercises the push path with a scheduled
//! test notification. Inert unless both debug mode and the playground
//! toggle are on.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::platform::PlatformServices;
use crate::plugins::registry::RegistryHandle;
use crate::plugins::types::{CapabilityPlugin, PluginContext, PluginError};
use crate::schedule::Scheduler;

const PANEL_DELAY: Duration = Duration::from_millis(500);
const NOTIFICATION_DELAY: Duration = Duration::from_secs(4);

/// Builds the panel-injection script from the registered plugin names.
fn panel_script(plugin_names: &[String]) -> String {
    let items: String = plugin_names
        .iter()
        .map(|name| format!("<li>{name}</li>"))
        .collect();
    format!(
        "(function () {{\n\
         if (document.getElementById('swv-playground')) return;\n\
         var panel = document.createElement('div');\n\
         panel.id = 'swv-playground';\n\
         panel.style.cssText = 'position:fixed;bottom:8px;right:8px;z-index:99999;' +\n\
             'background:rgba(0,0,0,0.8);color:#fff;padding:8px;font:12px monospace;';\n\
         panel.innerHTML = '<b>swv playground</b><ul>{items}</ul>';\n\
         document.body.appendChild(panel);\n\
         }})();"
    )
}

/// Injects the diagnostics panel and fires a delayed test notification.
#[derive(Default)]
pub struct PlaygroundPlugin {
    platform: Option<Arc<dyn PlatformServices>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    registry: Option<RegistryHandle>,
    enabled: bool,
}

impl PlaygroundPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CapabilityPlugin for PlaygroundPlugin {
    fn name(&self) -> &str {
        "Playground"
    }

    fn initialize(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        self.platform = Some(Arc::clone(&ctx.platform));
        self.scheduler = Some(Arc::clone(&ctx.scheduler));
        self.registry = Some(ctx.registry.clone());
        self.enabled = ctx.config.debug_mode && ctx.config.playground_enabled;
        Ok(())
    }

    fn on_surface_ready(&mut self, _url: &Url) -> Result<(), PluginError> {
        if !self.enabled {
            return Ok(());
        }
        let (Some(scheduler), Some(registry)) = (&self.scheduler, &self.registry) else {
            return Ok(());
        };

        let panel_registry = registry.clone();
        scheduler.schedule(
            PANEL_DELAY,
            Box::new(move || {
                let script = panel_script(&panel_registry.plugin_names());
                panel_registry.request_script_evaluation(script);
            }),
        );

        if registry.has_plugin("Push") {
            if let Some(platform) = &self.platform {
                let platform = Arc::clone(platform);
                scheduler.schedule(
                    NOTIFICATION_DELAY,
                    Box::new(move || {
                        if let Err(err) = platform.post_notification("swv", "Playground test") {
                            warn!(%err, "playground test notification failed");
                        }
                    }),
                );
            }
        }
        Ok(())
    }
}
