//! Push messaging capability.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::platform::PlatformServices;
use crate::plugins::types::{CapabilityPlugin, PluginContext, PluginError};

/// Registers the process for push messaging and serves diagnostic
/// test-notification requests on the `push` channel.
#[derive(Default)]
pub struct PushPlugin {
    platform: Option<Arc<dyn PlatformServices>>,
}

impl PushPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CapabilityPlugin for PushPlugin {
    fn name(&self) -> &str {
        "Push"
    }

    fn initialize(&mut self, ctx: &PluginContext) -> Result<(), PluginError> {
        if let Err(err) = ctx.platform.register_push_messaging() {
            warn!(%err, "push messaging registration failed");
        }
        self.platform = Some(Arc::clone(&ctx.platform));
        Ok(())
    }

    fn on_message(&mut self, channel: &str, payload: &Value) -> Result<(), PluginError> {
        let action = payload
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| PluginError::MalformedPayload {
                channel: channel.to_string(),
                reason: "expected an object with an 'action' string".to_string(),
            })?;
        match action {
            "test-notification" => {
                if let Some(platform) = &self.platform {
                    platform.post_notification("swv", "Test notification")?;
                }
                Ok(())
            }
            other => Err(PluginError::MalformedPayload {
                channel: channel.to_string(),
                reason: format!("unknown action '{other}'"),
            }),
        }
    }
}
