//! Location capability: one-shot location fixes delivered back to the page.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::platform::PlatformServices;
use crate::plugins::types::{CapabilityPlugin, PluginContext, PluginError};
use crate::surface::SurfaceHandle;

/// Script exposing `window.SWVLocation.request()` to the page.
///
/// The fix (or the failure) is delivered asynchronously by a second script
/// evaluation calling `window.SWVLocation._deliver`.
const BRIDGE_SCRIPT: &str = "\
window.SWVLocation = window.SWVLocation || {\n\
    request: function () {\n\
        window.swv.postMessage('location', null);\n\
    },\n\
    _deliver: function (latitude, longitude, error) {\n\
        if (window.SWVLocation.onfix) {\n\
            window.SWVLocation.onfix(latitude, longitude, error);\n\
        }\n\
    }\n\
};";

/// Answers page location requests with the platform's current fix.
#[derive(Default)]
pub struct LocationPlugin {
    platform: Option<Arc<dyn PlatformServices>>,
    surface: SurfaceHandle,
}

impl LocationPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CapabilityPlugin for LocationPlugin {
    fn name(&self) -> &str {
        "Location"
    }

    fn initialize(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        self.platform = Some(Arc::clone(&ctx.platform));
        self.surface = ctx.surface.clone();
        Ok(())
    }

    fn on_surface_ready(&mut self, _url: &Url) -> Result<(), PluginError> {
        self.surface.evaluate_script(BRIDGE_SCRIPT);
        Ok(())
    }

    fn on_message(&mut self, _channel: &str, _payload: &Value) -> Result<(), PluginError> {
        let Some(platform) = &self.platform else {
            return Ok(());
        };
        match platform.current_location() {
            Ok(fix) => {
                self.surface.evaluate_script(format!(
                    "window.SWVLocation._deliver({}, {}, null);",
                    fix.latitude, fix.longitude
                ));
            }
            Err(err) => {
                debug!(%err, "location query failed, delivering error to page");
                self.surface.evaluate_script(format!(
                    "window.SWVLocation._deliver(null, null, {});",
                    Value::from(err.to_string())
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;
    use crate::platform::testing::RecordingPlatform;
    use crate::platform::Coordinates;
    use crate::plugins::registry::PluginRegistry;
    use crate::schedule::{ManualScheduler, Scheduler};
    use crate::surface::{SurfaceChannel, SurfaceCommand};
    use serde_json::json;

    fn initialized(
        location: Option<Coordinates>,
    ) -> (LocationPlugin, Arc<SurfaceChannel>) {
        let platform = Arc::new(RecordingPlatform {
            location,
            ..RecordingPlatform::default()
        });
        let (channel, surface) = SurfaceChannel::new();
        let registry = PluginRegistry::new();
        let ctx = PluginContext {
            config: Arc::new(ShellConfig::default()),
            surface,
            platform: platform as Arc<dyn PlatformServices>,
            scheduler: ManualScheduler::new() as Arc<dyn Scheduler>,
            registry: registry.handle(),
        };
        let mut plugin = LocationPlugin::new();
        plugin.initialize(&ctx).unwrap();
        (plugin, channel)
    }

    #[test]
    fn test_fix_is_delivered_via_script() {
        let (mut plugin, channel) = initialized(Some(Coordinates {
            latitude: 52.52,
            longitude: 13.405,
        }));
        plugin.on_message("location", &json!(null)).unwrap();

        let commands = channel.drain();
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            SurfaceCommand::EvaluateScript(script) => {
                assert!(script.contains("_deliver(52.52, 13.405, null)"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_failure_is_delivered_as_error() {
        let (mut plugin, channel) = initialized(None);
        plugin.on_message("location", &json!(null)).unwrap();

        let commands = channel.drain();
        assert_eq!(commands.len(), 1);
        match &commands[0] {
            SurfaceCommand::EvaluateScript(script) => {
                assert!(script.contains("_deliver(null, null,"));
                assert!(script.contains("unavailable"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
