//! Navigation router.
//!
//! Every page-initiated navigation request is classified against a fixed
//! precedence ladder before the surface may act on it. Reserved schemes are
//! commands to the shell and never reach the page; external links may be
//! handed to the platform opener; everything else passes through to the
//! surface untouched.
//!
//! Precedence (first match wins):
//!
//! 1. `refresh:` scheme, reload of the primary application URL
//! 2. `fcm:` scheme, push test-notification diagnostic
//! 3. `share:<text>` prefix, system share sheet
//! 4. `print:` prefix, print dialog
//! 5. `tel:` / `sms:` / `mailto:` the platform can open
//! 6. external host the platform can open
//! 7. pass through

use percent_encoding::percent_decode_str;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::ShellConfig;
use crate::platform::PlatformServices;
use crate::plugins::registry::PluginRegistry;
use crate::surface::SurfaceHandle;

const SCHEME_RELOAD: &str = "refresh";
const SCHEME_PUSH_DIAGNOSTIC: &str = "fcm";
const PREFIX_SHARE: &str = "share:";
const PREFIX_PRINT: &str = "print:";
const OPENER_SCHEMES: [&str; 3] = ["tel", "sms", "mailto"];

/// What the surface host should do with a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The shell consumed the request; the surface must not navigate.
    Handled,
    /// Not a shell concern; the surface proceeds normally.
    PassThrough,
}

/// Classify one navigation request.
///
/// Pure apart from the effects the matching rule performs; the same request
/// against the same configuration always takes the same rule.
pub fn decide(
    url: &Url,
    config: &ShellConfig,
    surface: &SurfaceHandle,
    registry: &PluginRegistry,
    platform: &dyn PlatformServices,
) -> RouteDecision {
    let scheme = url.scheme();

    // Rule 1: reload command.
    if scheme == SCHEME_RELOAD {
        match config.app_url_parsed() {
            Some(app_url) => surface.load(app_url),
            None => warn!(app_url = %config.app_url, "reload requested but app.url is unparsable"),
        }
        return RouteDecision::Handled;
    }

    // Rule 2: push diagnostic. Routed like any page message; absence of the
    // Push plugin makes it a logged drop, the navigation stays consumed.
    if scheme == SCHEME_PUSH_DIAGNOSTIC {
        registry.dispatch_message("push", &json!({"action": "test-notification"}));
        return RouteDecision::Handled;
    }

    // Rule 3: share command, payload is the percent-encoded remainder.
    if let Some(encoded) = url.as_str().strip_prefix(PREFIX_SHARE) {
        let text = percent_decode_str(encoded).decode_utf8_lossy();
        if let Err(err) = platform.share_text(&text) {
            warn!(%err, "share sheet unavailable");
        }
        return RouteDecision::Handled;
    }

    // Rule 4: print command.
    if url.as_str().starts_with(PREFIX_PRINT) {
        if let Err(err) = platform.present_print() {
            warn!(%err, "print dialog unavailable");
        }
        return RouteDecision::Handled;
    }

    // Rule 5: communication schemes the platform can open.
    if OPENER_SCHEMES.contains(&scheme) && platform.can_open_url(url) {
        if let Err(err) = platform.open_url(url) {
            warn!(%url, %err, "platform opener failed");
        }
        return RouteDecision::Handled;
    }

    // Rule 6: external host. Same-host and hostless requests always fall
    // through; exception-list hosts stay inside the surface.
    if config.open_external_urls {
        if let Some(host) = url.host_str() {
            let external = !host.eq_ignore_ascii_case(&config.primary_host)
                && !config
                    .external_url_exception_list
                    .iter()
                    .any(|entry| entry.eq_ignore_ascii_case(host));
            if external && platform.can_open_url(url) {
                if let Err(err) = platform.open_url(url) {
                    warn!(%url, %err, "platform opener failed");
                }
                return RouteDecision::Handled;
            }
        }
    }

    // Rule 7: not a shell concern.
    debug!(%url, "navigation passes through");
    RouteDecision::PassThrough
}
