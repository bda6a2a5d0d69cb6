//! Toast capability: transient notices requested by the page.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::platform::PlatformServices;
use crate::plugins::types::{CapabilityPlugin, PluginContext, PluginError};
use crate::schedule::Scheduler;
use crate::surface::SurfaceHandle;

/// Script exposing `window.Toast.show(message)` to the page.
const BRIDGE_SCRIPT: &str = "\
window.Toast = window.Toast || {\n\
    show: function (message) {\n\
        window.swv.postMessage('toast', String(message));\n\
    }\n\
};";

const DEMO_DELAY: Duration = Duration::from_secs(2);

/// Presents page-requested notices through the platform notice presenter.
///
/// In debug mode a demonstration notice is scheduled two seconds after each
/// document load so the bridge can be verified by eye.
#[derive(Default)]
pub struct ToastPlugin {
    platform: Option<Arc<dyn PlatformServices>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    surface: SurfaceHandle,
    debug_mode: bool,
}

impl ToastPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CapabilityPlugin for ToastPlugin {
    fn name(&self) -> &str {
        "Toast"
    }

    fn initialize(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        self.platform = Some(Arc::clone(&ctx.platform));
        self.scheduler = Some(Arc::clone(&ctx.scheduler));
        self.surface = ctx.surface.clone();
        self.debug_mode = ctx.config.debug_mode;
        Ok(())
    }

    fn on_surface_ready(&mut self, _url: &Url) -> Result<(), PluginError> {
        self.surface.evaluate_script(BRIDGE_SCRIPT);
        if self.debug_mode {
            if let (Some(platform), Some(scheduler)) = (&self.platform, &self.scheduler) {
                let platform = Arc::clone(platform);
                scheduler.schedule(
                    DEMO_DELAY,
                    Box::new(move || {
                        if let Err(err) = platform.show_notice("Toast bridge is live") {
                            warn!(%err, "demonstration notice failed");
                        }
                    }),
                );
            }
        }
        Ok(())
    }

    fn on_message(&mut self, channel: &str, payload: &Value) -> Result<(), PluginError> {
        let message = payload.as_str().ok_or_else(|| PluginError::MalformedPayload {
            channel: channel.to_string(),
            reason: "expected a string".to_string(),
        })?;
        if let Some(platform) = &self.platform {
            platform.show_notice(message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;
    use crate::platform::testing::{PlatformCall, RecordingPlatform};
    use crate::plugins::registry::PluginRegistry;
    use crate::schedule::ManualScheduler;
    use crate::surface::SurfaceChannel;
    use serde_json::json;

    fn initialized(debug_mode: bool) -> (ToastPlugin, Arc<RecordingPlatform>, Arc<ManualScheduler>) {
        let platform = Arc::new(RecordingPlatform::default());
        let scheduler = ManualScheduler::new();
        let (_channel, surface) = SurfaceChannel::new();
        let registry = PluginRegistry::new();
        let ctx = PluginContext {
            config: Arc::new(ShellConfig {
                debug_mode,
                ..ShellConfig::default()
            }),
            surface,
            platform: Arc::clone(&platform) as Arc<dyn PlatformServices>,
            scheduler: Arc::clone(&scheduler) as Arc<dyn Scheduler>,
            registry: registry.handle(),
        };
        let mut plugin = ToastPlugin::new();
        plugin.initialize(&ctx).unwrap();
        (plugin, platform, scheduler)
    }

    #[test]
    fn test_message_presents_notice() {
        let (mut plugin, platform, _scheduler) = initialized(false);
        plugin.on_message("toast", &json!("saved")).unwrap();
        assert_eq!(platform.calls(), vec![PlatformCall::Notice("saved".into())]);
    }

    #[test]
    fn test_non_string_payload_is_malformed() {
        let (mut plugin, platform, _scheduler) = initialized(false);
        let err = plugin.on_message("toast", &json!({"msg": "x"})).unwrap_err();
        assert!(matches!(err, PluginError::MalformedPayload { .. }));
        assert!(platform.calls().is_empty());
    }

    #[test]
    fn test_debug_mode_schedules_demo_notice() {
        let (mut plugin, platform, scheduler) = initialized(true);
        plugin
            .on_surface_ready(&Url::parse("https://example.com/").unwrap())
            .unwrap();
        assert_eq!(scheduler.pending(), 1);
        assert!(platform.calls().is_empty());

        scheduler.run_all();
        assert_eq!(
            platform.calls(),
            vec![PlatformCall::Notice("Toast bridge is live".into())]
        );
    }

    #[test]
    fn test_release_mode_schedules_nothing() {
        let (mut plugin, _platform, scheduler) = initialized(false);
        plugin
            .on_surface_ready(&Url::parse("https://example.com/").unwrap())
            .unwrap();
        assert_eq!(scheduler.pending(), 0);
    }
}
