//! Launch-time permission requests.

use tracing::{debug, warn};

use crate::config::ShellConfig;
use crate::platform::{Permission, PlatformServices};

/// Forward each name in `permissions.on.launch` to the platform requester.
///
/// Unknown names are logged and skipped; a refused or failed request is not
/// fatal.
pub fn request_launch_permissions(config: &ShellConfig, platform: &dyn PlatformServices) {
    for name in &config.permissions_on_launch {
        let permission = match name.as_str() {
            "NOTIFICATIONS" => Permission::Notifications,
            "LOCATION" => Permission::Location,
            other => {
                warn!(permission = other, "unknown launch permission, skipping");
                continue;
            }
        };
        if let Err(err) = platform.request_permission(permission) {
            debug!(?permission, %err, "launch permission request failed");
        }
    }
}
