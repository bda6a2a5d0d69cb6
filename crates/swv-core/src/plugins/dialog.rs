//! Dialog capability: modal dialogs requested by the page.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::platform::PlatformServices;
use crate::plugins::types::{CapabilityPlugin, PluginContext, PluginError};
use crate::surface::SurfaceHandle;

/// Script exposing `window.Dialog.show(title, message)` to the page.
const BRIDGE_SCRIPT: &str = "\
window.Dialog = window.Dialog || {\n\
    show: function (title, message) {\n\
        window.swv.postMessage('dialog', { title: String(title), message: String(message) });\n\
    }\n\
};";

#[derive(Debug, Deserialize)]
struct DialogRequest {
    title: String,
    message: String,
}

/// Presents page-requested dialogs through the platform dialog presenter.
#[derive(Default)]
pub struct DialogPlugin {
    platform: Option<Arc<dyn PlatformServices>>,
    surface: SurfaceHandle,
}

impl DialogPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CapabilityPlugin for DialogPlugin {
    fn name(&self) -> &str {
        "Dialog"
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

    fn on_message(&mut self, channel: &str, payload: &Value) -> Result<(), PluginError> {
        let request: DialogRequest =
            serde_json::from_value(payload.clone()).map_err(|err| PluginError::MalformedPayload {
                channel: channel.to_string(),
                reason: err.to_string(),
            })?;
        if let Some(platform) = &self.platform {
            platform.show_dialog(&request.title, &request.message)?;
        }
        Ok(())
    }
}
