//! Rating capability: app-review prompts requested by the page.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::platform::PlatformServices;
use crate::plugins::types::{CapabilityPlugin, PluginContext, PluginError};

/// Forwards page rating requests to the platform review prompt.
///
/// The platform decides whether the prompt actually appears; a refusal is
/// not an error.
#[derive(Default)]
pub struct RatingPlugin {
    platform: Option<Arc<dyn PlatformServices>>,
}

impl RatingPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CapabilityPlugin for RatingPlugin {
    fn name(&self) -> &str {
        "Rating"
    }

    fn initialize(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        self.platform = Some(Arc::clone(&ctx.platform));
        Ok(())
    }

    fn on_message(&mut self, _channel: &str, _payload: &Value) -> Result<(), PluginError> {
        if let Some(platform) = &self.platform {
            if let Err(err) = platform.request_review() {
                debug!(%err, "review prompt unavailable");
            }
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
    use crate::schedule::{ManualScheduler, Scheduler};
    use crate::surface::SurfaceChannel;
    use serde_json::json;

    #[test]
    fn test_message_requests_review() {
        let platform = Arc::new(RecordingPlatform::default());
        let (_channel, surface) = SurfaceChannel::new();
        let registry = PluginRegistry::new();
        let ctx = PluginContext {
            config: Arc::new(ShellConfig::default()),
            surface,
            platform: Arc::clone(&platform) as Arc<dyn PlatformServices>,
            scheduler: ManualScheduler::new() as Arc<dyn Scheduler>,
            registry: registry.handle(),
        };
        let mut plugin = RatingPlugin::new();
        plugin.initialize(&ctx).unwrap();

        plugin.on_message("rating", &json!(null)).unwrap();
        assert_eq!(platform.calls(), vec![PlatformCall::Review]);
    }
}
