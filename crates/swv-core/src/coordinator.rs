//! Bridge coordinator.
//!
//! The coordinator sits between the surface host and everything else: it
//! turns surface events (navigation requests, load completion, page
//! messages, pull-to-refresh) into router and registry calls, and it runs
//! the resource-selection flow for page-initiated uploads.
//!
//! ## Selection state machine
//!
//! ```text
//!   Idle --begin--> AwaitingSourceChoice --choice--> AwaitingPickerResult
//!     ^                    |  cancel                     |  result/cancel
//!     |                    v                             v
//!     +----- empty resolution <----------- copy barrier, continuation
//! ```
//!
//! One selection at a time. A request arriving while the machine is not
//! idle resolves empty immediately; the in-flight request is unaffected.
//! The continuation fires exactly once per request, always; an empty path
//! list means cancellation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::config::{PickerTiers, ShellConfig};
use crate::platform::{PickerSource, PlatformServices, SourceFilter, StorageLocations};
use crate::plugins;
use crate::plugins::registry::{DispatchOutcome, PluginRegistry};
use crate::plugins::types::PluginContext;
use crate::router::{self, RouteDecision};
use crate::schedule::Scheduler;
use crate::surface::SurfaceHandle;

/// Injected after every top-level load so the page can detect the shell.
const PLATFORM_READY_SCRIPT: &str =
    "if (typeof window.setPlatform === 'function') { window.setPlatform('native'); }";

/// Verdict handed back to the surface host for a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPolicy {
    /// Let the surface perform the navigation.
    Allow,
    /// The shell consumed the request; the surface must stop it.
    Cancel,
}

/// Receives the final local paths of a resource selection.
///
/// An empty vector means the selection was cancelled or yielded nothing.
pub type SelectionContinuation = Box<dyn FnOnce(Vec<PathBuf>) + Send>;

/// The explicit phase of the selection flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionState {
    Idle,
    AwaitingSourceChoice,
    AwaitingPickerResult,
}

struct SelectionPending {
    continuation: SelectionContinuation,
    multiple: bool,
    filter: SourceFilter,
}

struct SelectionMachine {
    state: SelectionState,
    pending: Option<SelectionPending>,
}

impl SelectionMachine {
    fn new() -> Self {
        Self {
            state: SelectionState::Idle,
            pending: None,
        }
    }
}

/// Central wiring between the surface host, router, registry and platform.
pub struct BridgeCoordinator {
    config: Arc<ShellConfig>,
    surface: SurfaceHandle,
    registry: PluginRegistry,
    platform: Arc<dyn PlatformServices>,
    storage: StorageLocations,
    selection: Arc<Mutex<SelectionMachine>>,
}

impl BridgeCoordinator {
    /// Build the coordinator: registers the configured plugins and
    /// initializes them with a context built from these collaborators.
    pub fn new(
        config: Arc<ShellConfig>,
        surface: SurfaceHandle,
        platform: Arc<dyn PlatformServices>,
        scheduler: Arc<dyn Scheduler>,
        storage: StorageLocations,
    ) -> Self {
        let registry = PluginRegistry::new();
        plugins::register_enabled(&registry, &config);
        let ctx = PluginContext {
            config: Arc::clone(&config),
            surface: surface.clone(),
            platform: Arc::clone(&platform),
            scheduler,
            registry: registry.handle(),
        };
        registry.initialize_all(&ctx);
        Self {
            config,
            surface,
            registry,
            platform,
            storage,
            selection: Arc::new(Mutex::new(SelectionMachine::new())),
        }
    }

    /// The plugin registry owned by this coordinator.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Navigation-decision hook, called before the surface commits a
    /// page-initiated navigation.
    pub fn on_navigation_request(&self, url: &Url) -> NavigationPolicy {
        match router::decide(url, &self.config, &self.surface, &self.registry, &*self.platform) {
            RouteDecision::Handled => NavigationPolicy::Cancel,
            RouteDecision::PassThrough => NavigationPolicy::Allow,
        }
    }

    /// Load-finished hook: inject the platform-detection script, then give
    /// every plugin its surface-ready hook.
    pub fn on_load_finished(&self, url: &Url) {
        self.surface.evaluate_script(PLATFORM_READY_SCRIPT);
        self.registry.notify_surface_ready(url);
    }

    /// Inbound page message hook.
    pub fn on_message(&self, channel: &str, payload: &Value) -> DispatchOutcome {
        self.registry.dispatch_message(channel, payload)
    }

    /// Pull-to-refresh gesture hook.
    pub fn on_pull_to_refresh(&self) {
        if self.config.pull_to_refresh_enabled {
            self.surface.reload();
        } else {
            debug!("pull-to-refresh disabled by configuration");
        }
    }

    /// Present the system share sheet for the current page.
    ///
    /// The shared link is the primary application URL with the configured
    /// share suffix and the percent-encoded page URL appended.
    pub fn share_current_page(&self, page_url: &Url) {
        let encoded = utf8_percent_encode(page_url.as_str(), NON_ALPHANUMERIC);
        let link = format!(
            "{}{}{}",
            self.config.app_url.trim_end_matches('/'),
            self.config.share_url_suffix,
            encoded
        );
        if let Err(err) = self.platform.share_text(&link) {
            warn!(%err, "share sheet unavailable");
        }
    }

    /// Begin a page-initiated resource selection.
    ///
    /// `page_allows_multiple` is the page's request; the effective
    /// multiplicity is its AND with the configuration flag. `filter`
    /// restricts what the picker offers. `continuation` fires exactly once
    /// with the final local paths.
    pub fn begin_resource_selection(
        &self,
        page_allows_multiple: bool,
        filter: SourceFilter,
        continuation: SelectionContinuation,
    ) {
        if !self.config.uploads_enabled {
            debug!("uploads disabled, resolving selection empty");
            continuation(Vec::new());
            return;
        }

        let mut machine = self.selection.lock();
        if machine.state != SelectionState::Idle {
            debug!(state = ?machine.state, "selection already in flight, resolving new request empty");
            drop(machine);
            continuation(Vec::new());
            return;
        }

        let multiple = self.config.multiple_uploads_enabled && page_allows_multiple;
        machine.pending = Some(SelectionPending {
            continuation,
            multiple,
            filter,
        });

        match self.config.picker_tiers {
            PickerTiers::Full => {
                machine.state = SelectionState::AwaitingSourceChoice;
                drop(machine);
                let sources = [
                    PickerSource::Camera,
                    PickerSource::PhotoLibrary,
                    PickerSource::FileBrowser,
                ];
                if let Err(err) = self.platform.present_source_choice(&sources) {
                    warn!(%err, "source-choice sheet unavailable, cancelling selection");
                    self.resolve_selection(Vec::new());
                }
            }
            PickerTiers::LibraryOnly => {
                machine.state = SelectionState::AwaitingPickerResult;
                drop(machine);
                if let Err(err) =
                    self.platform
                        .present_picker(PickerSource::PhotoLibrary, filter, multiple)
                {
                    warn!(%err, "picker unavailable, cancelling selection");
                    self.resolve_selection(Vec::new());
                }
            }
        }
    }

    /// Host callback: the user picked a source, or dismissed the sheet.
    pub fn on_source_chosen(&self, source: Option<PickerSource>) {
        let mut machine = self.selection.lock();
        if machine.state != SelectionState::AwaitingSourceChoice {
            warn!(state = ?machine.state, "unexpected source choice, ignoring");
            return;
        }
        match source {
            Some(source) => {
                machine.state = SelectionState::AwaitingPickerResult;
                let (multiple, filter) = machine
                    .pending
                    .as_ref()
                    .map(|p| (p.multiple, p.filter))
                    .unwrap_or((false, SourceFilter::Any));
                drop(machine);
                if let Err(err) = self.platform.present_picker(source, filter, multiple) {
                    warn!(%err, "picker unavailable, cancelling selection");
                    self.resolve_selection(Vec::new());
                }
            }
            None => {
                drop(machine);
                self.resolve_selection(Vec::new());
            }
        }
    }

    /// Host callback: the picker finished with zero or more items.
    ///
    /// Each item is copied into the process-private selection directory on
    /// a worker thread; the continuation fires once every copy has either
    /// completed or failed. A failed copy drops that item only.
    pub fn on_picker_result(&self, items: Vec<PathBuf>) {
        {
            let machine = self.selection.lock();
            if machine.state != SelectionState::AwaitingPickerResult {
                warn!(state = ?machine.state, "unexpected picker result, ignoring");
                return;
            }
        }
        if items.is_empty() {
            self.resolve_selection(Vec::new());
            return;
        }

        let selection = Arc::clone(&self.selection);
        let dir = self.storage.selection_dir.clone();
        std::thread::spawn(move || {
            if let Err(err) = std::fs::create_dir_all(&dir) {
                warn!(dir = %dir.display(), %err, "cannot create selection directory");
                resolve_on(&selection, Vec::new());
                return;
            }
            let workers: Vec<_> = items
                .into_iter()
                .map(|item| {
                    let dir = dir.clone();
                    std::thread::spawn(move || copy_into(&dir, &item))
                })
                .collect();
            // Barrier: every copy completes or fails before resolution.
            let mut copied = Vec::new();
            for worker in workers {
                match worker.join() {
                    Ok(Some(path)) => copied.push(path),
                    Ok(None) => {}
                    Err(_) => warn!("selection copy worker panicked, dropping item"),
                }
            }
            resolve_on(&selection, copied);
        });
    }

    /// Destination path for a download response.
    ///
    /// Downloads are user data and go to the persistent download directory,
    /// never the wiped selection area.
    pub fn download_destination(&self, suggested_name: &str) -> PathBuf {
        // Strip any path components a hostile page may have smuggled in.
        let name = Path::new(suggested_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("download-{}", uuid::Uuid::new_v4()));
        self.storage.download_dir.join(name)
    }

    /// Host callback: a download finished at `path`.
    ///
    /// Routed as a notice through the registry's message path so an
    /// interested plugin can inform the user.
    pub fn on_download_finished(&self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.registry
            .dispatch_message("toast", &json!(format!("Download complete: {name}")));
    }

    fn resolve_selection(&self, paths: Vec<PathBuf>) {
        resolve_on(&self.selection, paths);
    }
}

/// Resolve the pending selection: back to idle, continuation fired once.
fn resolve_on(selection: &Mutex<SelectionMachine>, paths: Vec<PathBuf>) {
    let pending = {
        let mut machine = selection.lock();
        machine.state = SelectionState::Idle;
        machine.pending.take()
    };
    match pending {
        Some(p) => (p.continuation)(paths),
        None => debug!("selection resolved with no pending continuation"),
    }
}

/// Copy one picked item into the selection directory under a fresh name.
fn copy_into(dir: &Path, item: &Path) -> Option<PathBuf> {
    let id = uuid::Uuid::new_v4();
    let dest = match item.extension() {
        Some(ext) => dir.join(format!("{id}.{}", ext.to_string_lossy())),
        None => dir.join(id.to_string()),
    };
    match std::fs::copy(item, &dest) {
        Ok(_) => Some(dest),
        Err(err) => {
            warn!(item = %item.display(), %err, "copy failed, dropping item");
            None
        }
    }
}
