//! Web-surface command channel and non-owning surface handle.
//!
//! The embedded web surface runs on its own execution context; every
//! navigation, lifecycle and message event arrives serialized on that
//! context. Components that want to push work back into the surface
//! (script evaluation, loads, reloads) never call it directly. They go
//! through a [`SurfaceChannel`]: a FIFO command queue that the surface host
//! owns and drains on its own context.
//!
//! ## Ordering
//!
//! Commands are delivered strictly in the order they were pushed. Two
//! script-evaluation requests issued in order X then Y execute in order
//! X then Y, even when pushed from background threads (the queue is a
//! single mutex-guarded `VecDeque`).
//!
//! ## Lifetime
//!
//! The host holds the only `Arc<SurfaceChannel>`; everything else holds a
//! [`SurfaceHandle`] wrapping a `Weak` reference. When the host tears the
//! surface down and drops its `Arc`, every outstanding handle is
//! invalidated: pushes become silent no-ops instead of dangling.
//!
//! ## Script bridge convention
//!
//! Injected bridge scripts call `window.swv.postMessage(channel, payload)`;
//! the host maps that to the coordinator's inbound-message hook.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;
use url::Url;

/// A command for the surface host to execute on its own context.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    /// Evaluate a script fragment in the surface, fire-and-forget.
    EvaluateScript(String),
    /// Navigate the surface to the given URL.
    Load(Url),
    /// Reload the current document.
    Reload,
}

/// FIFO command queue owned by the surface host.
#[derive(Debug, Default)]
pub struct SurfaceChannel {
    queue: Mutex<VecDeque<SurfaceCommand>>,
}

impl SurfaceChannel {
    /// Create a channel and return it with a handle attached to it.
    pub fn new() -> (Arc<Self>, SurfaceHandle) {
        let channel = Arc::new(Self::default());
        let handle = SurfaceHandle {
            channel: Arc::downgrade(&channel),
        };
        (channel, handle)
    }

    /// Append a command to the queue.
    pub fn push(&self, command: SurfaceCommand) {
        self.queue.lock().push_back(command);
    }

    /// Take all queued commands, preserving push order.
    ///
    /// Called by the surface host from its own execution context.
    pub fn drain(&self) -> Vec<SurfaceCommand> {
        self.queue.lock().drain(..).collect()
    }

    /// Number of commands currently queued.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

/// Non-owning handle to the active surface.
///
/// Cloneable and usable from any thread. The handle never extends the
/// surface's lifetime; once the host drops its channel the handle's
/// operations do nothing.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    channel: Weak<SurfaceChannel>,
}

impl Default for SurfaceHandle {
    fn default() -> Self {
        Self::detached()
    }
}

impl SurfaceHandle {
    /// A handle that is attached to nothing.
    ///
    /// Useful as a placeholder before the surface exists; every operation
    /// is a no-op.
    pub fn detached() -> Self {
        Self {
            channel: Weak::new(),
        }
    }

    /// Whether the surface is still alive.
    pub fn is_attached(&self) -> bool {
        self.channel.strong_count() > 0
    }

    /// Request evaluation of a script fragment, fire-and-forget.
    pub fn evaluate_script(&self, script: impl Into<String>) {
        self.push(SurfaceCommand::EvaluateScript(script.into()));
    }

    /// Request navigation to `url`.
    pub fn load(&self, url: Url) {
        self.push(SurfaceCommand::Load(url));
    }

    /// Request a reload of the current document.
    pub fn reload(&self) {
        self.push(SurfaceCommand::Reload);
    }

    fn push(&self, command: SurfaceCommand) {
        match self.channel.upgrade() {
            Some(channel) => channel.push(command),
            None => debug!(?command, "surface gone, dropping command"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_drain_in_push_order() {
        let (channel, handle) = SurfaceChannel::new();
        handle.evaluate_script("first()");
        handle.evaluate_script("second()");
        handle.reload();

        let commands = channel.drain();
        assert_eq!(
            commands,
            vec![
                SurfaceCommand::EvaluateScript("first()".to_string()),
                SurfaceCommand::EvaluateScript("second()".to_string()),
                SurfaceCommand::Reload,
            ]
        );
        assert!(channel.is_empty());
    }

    #[test]
    fn test_handle_outlives_channel_without_dangling() {
        let (channel, handle) = SurfaceChannel::new();
        assert!(handle.is_attached());
        drop(channel);
        assert!(!handle.is_attached());
        // Must not panic; the command is silently dropped.
        handle.evaluate_script("noop()");
    }

    #[test]
    fn test_detached_handle_is_noop() {
        let handle = SurfaceHandle::detached();
        assert!(!handle.is_attached());
        handle.reload();
    }

    #[test]
    fn test_cross_thread_pushes_are_ordered_per_sender() {
        let (channel, handle) = SurfaceChannel::new();
        let worker = {
            let handle = handle.clone();
            std::thread::spawn(move || {
                for i in 0..10 {
                    handle.evaluate_script(format!("job({i})"));
                }
            })
        };
        worker.join().unwrap();

        let commands = channel.drain();
        let expected: Vec<SurfaceCommand> = (0..10)
            .map(|i| SurfaceCommand::EvaluateScript(format!("job({i})")))
            .collect();
        assert_eq!(commands, expected);
    }
}
