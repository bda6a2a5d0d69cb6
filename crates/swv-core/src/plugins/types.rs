//! Capability plugin contract.
//!
//! A capability plugin packages one native capability behind a stable name
//! and three lifecycle hooks. Plugins never talk to each other directly and
//! never receive a strong reference to the surface; everything they need
//! arrives through [`PluginContext`] at initialization.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::ShellConfig;
use crate::platform::{PlatformError, PlatformServices};
use crate::plugins::registry::RegistryHandle;
use crate::schedule::Scheduler;
use crate::surface::SurfaceHandle;

/// Failure inside a plugin hook.
///
/// Hook failures are contained: the registry logs them and moves on, they
/// never unwind into the surface host.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The payload on a bridge channel did not match the expected shape.
    #[error("malformed payload on channel '{channel}': {reason}")]
    MalformedPayload { channel: String, reason: String },
    /// A platform capability the plugin relies on failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Everything a plugin may retain, handed over exactly once at
/// initialization.
///
/// The surface reference is the weak [`SurfaceHandle`]; a plugin keeping it
/// can never extend the surface's lifetime.
#[derive(Clone)]
pub struct PluginContext {
    pub config: Arc<ShellConfig>,
    pub surface: SurfaceHandle,
    pub platform: Arc<dyn PlatformServices>,
    pub scheduler: Arc<dyn Scheduler>,
    pub registry: RegistryHandle,
}

/// One native capability exposed to the web application.
///
/// Hooks default to no-ops so a plugin implements only what it uses. Hooks
/// must be deterministic for the same inputs, apart from work explicitly
/// handed to the scheduler.
pub trait CapabilityPlugin: Send {
    /// Stable identifier; also the basis of the plugin's message channel
    /// (the lower-cased name).
    fn name(&self) -> &str;

    /// Called once, before any other hook. The only point at which a plugin
    /// may retain pieces of the context.
    fn initialize(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called after each top-level document finishes loading.
    fn on_surface_ready(&mut self, _url: &Url) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called when a page message addressed to this plugin's channel
    /// arrives.
    fn on_message(&mut self, _channel: &str, _payload: &Value) -> Result<(), PluginError> {
        Ok(())
    }
}
