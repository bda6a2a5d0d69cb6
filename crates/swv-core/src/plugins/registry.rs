//! Plugin registry and shared registry view.
//!
//! The registry owns every registered plugin, in registration order, and is
//! the only component that calls plugin hooks. Other components (the
//! router, the coordinator, plugins themselves) hold a [`RegistryHandle`],
//! a cheap shared view good for name lookups and for pushing script
//! evaluations to the surface from any thread.
//!
//! ## Lifecycle
//!
//! ```text
//!   register(..) x N   ->   initialize_all(ctx)   ->   steady state
//!   (population)             (once, in order)          (ready / message
//!                                                       hooks, dispatch)
//! ```
//!
//! The plugin list is fully populated before `initialize_all`; afterwards
//! it only ever shrinks to zero at teardown.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::plugins::types::{CapabilityPlugin, PluginContext};
use crate::surface::SurfaceHandle;

/// Result of routing one inbound page message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Exactly one plugin received the message.
    Delivered,
    /// No plugin claims the channel; the message was dropped.
    Dropped,
}

#[derive(Default)]
struct RegistryShared {
    names: RwLock<Vec<String>>,
    surface: RwLock<Option<SurfaceHandle>>,
}

/// Shared, thread-safe view of the registry.
///
/// Cloneable and `Send + Sync`; safe to hand to plugins and background
/// workers.
#[derive(Clone, Default)]
pub struct RegistryHandle {
    shared: Arc<RegistryShared>,
}

impl RegistryHandle {
    /// Names of all registered plugins, in registration order.
    pub fn plugin_names(&self) -> Vec<String> {
        self.shared.names.read().clone()
    }

    /// Whether a plugin with exactly this name is registered.
    pub fn has_plugin(&self, name: &str) -> bool {
        self.shared.names.read().iter().any(|n| n == name)
    }

    /// Push a script evaluation to the surface, fire-and-forget.
    ///
    /// Callable from any thread; evaluations are delivered in call order.
    /// A no-op (with a `debug!`) before initialization or after the surface
    /// is gone.
    pub fn request_script_evaluation(&self, script: impl Into<String>) {
        match self.shared.surface.read().as_ref() {
            Some(surface) => surface.evaluate_script(script.into()),
            None => debug!("no surface attached, dropping script evaluation"),
        }
    }
}

struct RegistryInner {
    plugins: Vec<Box<dyn CapabilityPlugin>>,
    initialized: bool,
}

/// Owner of all capability plugins.
pub struct PluginRegistry {
    inner: Mutex<RegistryInner>,
    shared: Arc<RegistryShared>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                plugins: Vec::new(),
                initialized: false,
            }),
            shared: Arc::new(RegistryShared::default()),
        }
    }

    /// Shared view of this registry.
    pub fn handle(&self) -> RegistryHandle {
        RegistryHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Register a plugin under its stable name.
    ///
    /// Registering a second plugin with a name already present keeps the
    /// first instance and drops the new one.
    pub fn register(&self, plugin: Box<dyn CapabilityPlugin>) {
        let name = plugin.name().to_string();
        let mut inner = self.inner.lock();
        if inner.plugins.iter().any(|p| p.name() == name) {
            warn!(plugin = %name, "plugin already registered, ignoring duplicate");
            return;
        }
        debug!(plugin = %name, "plugin registered");
        inner.plugins.push(plugin);
        self.shared.names.write().push(name);
    }

    /// Run `f` against the plugin registered under exactly `name`.
    ///
    /// Returns `None` without calling `f` when no such plugin exists.
    /// Matching is case-sensitive, unlike channel dispatch.
    pub fn with_plugin<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut dyn CapabilityPlugin) -> R,
    ) -> Option<R> {
        let mut inner = self.inner.lock();
        inner
            .plugins
            .iter_mut()
            .find(|p| p.name() == name)
            .map(|p| f(p.as_mut()))
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.inner.lock().plugins.len()
    }

    /// Whether no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().plugins.is_empty()
    }

    /// Initialize every plugin, in registration order.
    ///
    /// Stores the context's surface handle for script evaluations. A second
    /// call is a warned no-op; plugins are never initialized twice.
    pub fn initialize_all(&self, ctx: &PluginContext) {
        let mut inner = self.inner.lock();
        if inner.initialized {
            warn!("plugin registry already initialized, ignoring");
            return;
        }
        inner.initialized = true;
        *self.shared.surface.write() = Some(ctx.surface.clone());
        for plugin in &mut inner.plugins {
            if let Err(err) = plugin.initialize(ctx) {
                warn!(plugin = plugin.name(), %err, "plugin initialization failed");
            }
        }
    }

    /// Notify every plugin that a document finished loading.
    ///
    /// A failing hook is logged and does not stop the remaining plugins.
    pub fn notify_surface_ready(&self, url: &Url) {
        let mut inner = self.inner.lock();
        for plugin in &mut inner.plugins {
            if let Err(err) = plugin.on_surface_ready(url) {
                warn!(plugin = plugin.name(), %err, "surface-ready hook failed");
            }
        }
    }

    /// Route an inbound page message to the plugin owning `channel`.
    ///
    /// Channel matching is case-insensitive against plugin names; at most
    /// one plugin receives the message. An unroutable message is dropped
    /// with a `debug!` and no side effects.
    pub fn dispatch_message(&self, channel: &str, payload: &Value) -> DispatchOutcome {
        let mut inner = self.inner.lock();
        let recipient = inner
            .plugins
            .iter_mut()
            .find(|p| p.name().eq_ignore_ascii_case(channel));
        match recipient {
            Some(plugin) => {
                if let Err(err) = plugin.on_message(channel, payload) {
                    warn!(plugin = plugin.name(), channel, %err, "message hook failed");
                }
                DispatchOutcome::Delivered
            }
            None => {
                debug!(channel, "no plugin claims channel, dropping message");
                DispatchOutcome::Dropped
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording plugin double shared by module tests.

    use super::*;
    use crate::plugins::types::PluginError;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum PluginEvent {
        Initialized,
        SurfaceReady(String),
        Message(String, Value),
    }

    #[derive(Default)]
    pub(crate) struct EventLog {
        events: Mutex<Vec<(String, PluginEvent)>>,
    }

    impl EventLog {
        pub(crate) fn events(&self) -> Vec<(String, PluginEvent)> {
            self.events.lock().clone()
        }
    }

    /// Plugin that records every hook invocation into a shared log.
    pub(crate) struct RecordingPlugin {
        name: String,
        log: Arc<EventLog>,
        pub(crate) fail_ready: bool,
    }

    impl RecordingPlugin {
        pub(crate) fn new(name: &str, log: &Arc<EventLog>) -> Self {
            Self {
                name: name.to_string(),
                log: Arc::clone(log),
                fail_ready: false,
            }
        }
    }

    impl CapabilityPlugin for RecordingPlugin {
        fn name(&self) -> &str {
            &self.name
        }

        fn initialize(&mut self, _ctx: &PluginContext) -> Result<(), PluginError> {
            self.log
                .events
                .lock()
                .push((self.name.clone(), PluginEvent::Initialized));
            Ok(())
        }

        fn on_surface_ready(&mut self, url: &Url) -> Result<(), PluginError> {
            self.log
                .events
                .lock()
                .push((self.name.clone(), PluginEvent::SurfaceReady(url.to_string())));
            if self.fail_ready {
                return Err(PluginError::MalformedPayload {
                    channel: self.name.clone(),
                    reason: "induced failure".to_string(),
                });
            }
            Ok(())
        }

        fn on_message(&mut self, channel: &str, payload: &Value) -> Result<(), PluginError> {
            self.log.events.lock().push((
                self.name.clone(),
                PluginEvent::Message(channel.to_string(), payload.clone()),
            ));
            Ok(())
        }
    }

}
