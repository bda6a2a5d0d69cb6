//! Bridge and navigation control for a single-webview native shell.
//!
//! The shell embeds one web surface and wires native capabilities to it
//! through three cooperating pieces:
//!
//! ```text
//!   +-------------------+        +--------------------+
//!   |   Web Surface     | <----- |  BridgeCoordinator |
//!   |   (host-owned)    | -----> |                    |
//!   +-------------------+  events+---+------------+---+
//!         ^   SurfaceChannel         |            |
//!         |   (FIFO commands)        v            v
//!         |                    NavigationRouter  PluginRegistry
//!         |                          |            |
//!         +--------------------------+     CapabilityPlugins
//!                                          (Toast, Dialog, ...)
//!                                                 |
//!                                          PlatformServices
//! ```
//!
//! - [`config::ShellConfig`] is an immutable startup snapshot every
//!   component reads.
//! - [`surface::SurfaceChannel`] serializes script evaluations and loads
//!   back into the surface host's execution context.
//! - [`router::decide`] classifies navigation requests against the
//!   reserved-scheme and external-link ladder.
//! - [`coordinator::BridgeCoordinator`] turns surface events into router
//!   and registry calls and runs the resource-selection flow.
//! - [`platform::PlatformServices`] is the seam to the host OS; the core
//!   never touches an OS API directly.

pub mod config;
pub mod coordinator;
pub mod permissions;
pub mod platform;
pub mod plugins;
pub mod router;
pub mod schedule;
pub mod surface;

pub use config::{PickerTiers, ShellConfig};
pub use coordinator::{BridgeCoordinator, NavigationPolicy, SelectionContinuation};
pub use platform::{
    Coordinates, NullPlatform, Permission, PickerSource, PlatformError, PlatformServices,
    SourceFilter, StorageLocations,
};
pub use plugins::registry::{DispatchOutcome, PluginRegistry, RegistryHandle};
pub use plugins::types::{CapabilityPlugin, PluginContext, PluginError};
pub use router::RouteDecision;
pub use schedule::{ManualScheduler, ScheduledJob, Scheduler, SpawnScheduler};
pub use surface::{SurfaceChannel, SurfaceCommand, SurfaceHandle};
