//! swv: interactive routing console over the bridge core.
//!
//! Stands in for a real surface host: loads a properties file, wires the
//! configured plugins into a [`BridgeCoordinator`] over a console-logging
//! platform, then reads URLs from stdin and prints the Allow/Cancel verdict
//! together with every command the bridge pushed at the surface.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use swv_core::{
    permissions, BridgeCoordinator, NavigationPolicy, PickerSource, PlatformError,
    PlatformServices, ShellConfig, SourceFilter, SpawnScheduler, StorageLocations, SurfaceChannel,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "swv", about = "Routing console for the swv bridge core")]
struct Args {
    /// Path to the properties configuration file.
    #[arg(short, long, default_value = "swv.properties")]
    config: PathBuf,

    /// Classify a single URL and exit instead of running the console.
    #[arg(long)]
    route: Option<String>,
}

/// Platform implementation that narrates every capability call.
///
/// Openability mirrors a typical mobile host: web and communication
/// schemes open, everything else does not.
struct ConsolePlatform;

impl ConsolePlatform {
    fn narrate(&self, action: &str) -> Result<(), PlatformError> {
        info!(action, "platform");
        Ok(())
    }
}

impl PlatformServices for ConsolePlatform {
    fn can_open_url(&self, url: &Url) -> bool {
        matches!(url.scheme(), "http" | "https" | "tel" | "sms" | "mailto")
    }

    fn open_url(&self, url: &Url) -> Result<(), PlatformError> {
        self.narrate(&format!("open {url}"))
    }

    fn share_text(&self, text: &str) -> Result<(), PlatformError> {
        self.narrate(&format!("share {text:?}"))
    }

    fn present_print(&self) -> Result<(), PlatformError> {
        self.narrate("print dialog")
    }

    fn show_notice(&self, message: &str) -> Result<(), PlatformError> {
        self.narrate(&format!("notice {message:?}"))
    }

    fn show_dialog(&self, title: &str, message: &str) -> Result<(), PlatformError> {
        self.narrate(&format!("dialog {title:?}: {message:?}"))
    }

    fn post_notification(&self, title: &str, body: &str) -> Result<(), PlatformError> {
        self.narrate(&format!("notification {title:?}: {body:?}"))
    }

    fn request_review(&self) -> Result<(), PlatformError> {
        self.narrate("review prompt")
    }

    fn current_location(&self) -> Result<swv_core::Coordinates, PlatformError> {
        Err(PlatformError::Unavailable("current_location"))
    }

    fn request_permission(
        &self,
        permission: swv_core::Permission,
    ) -> Result<(), PlatformError> {
        self.narrate(&format!("permission {permission:?}"))
    }

    fn register_push_messaging(&self) -> Result<(), PlatformError> {
        self.narrate("push registration")
    }

    fn present_source_choice(&self, sources: &[PickerSource]) -> Result<(), PlatformError> {
        self.narrate(&format!("source choice {sources:?}"))
    }

    fn present_picker(
        &self,
        source: PickerSource,
        filter: SourceFilter,
        multiple: bool,
    ) -> Result<(), PlatformError> {
        self.narrate(&format!("picker {source:?} filter={filter:?} multiple={multiple}"))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Arc::new(ShellConfig::load(&args.config));
    info!(app_url = %config.app_url, plugins = ?config.enabled_plugins, "configuration loaded");

    let platform: Arc<dyn PlatformServices> = Arc::new(ConsolePlatform);
    permissions::request_launch_permissions(&config, &*platform);

    let (channel, surface) = SurfaceChannel::new();
    let coordinator = BridgeCoordinator::new(
        Arc::clone(&config),
        surface,
        platform,
        Arc::new(SpawnScheduler),
        StorageLocations::resolve(),
    );

    if let Some(raw) = args.route {
        let url = Url::parse(&raw).with_context(|| format!("invalid URL '{raw}'"))?;
        report(&coordinator, &channel, &url);
        return Ok(());
    }

    if let Some(app_url) = config.app_url_parsed() {
        coordinator.on_load_finished(&app_url);
        drain(&channel);
    }

    println!("enter URLs to classify; 'quit' exits");
    let stdin = std::io::stdin();
    loop {
        print!("swv> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        match Url::parse(line) {
            Ok(url) => report(&coordinator, &channel, &url),
            Err(err) => println!("  unparsable: {err}"),
        }
    }
    Ok(())
}

fn report(coordinator: &BridgeCoordinator, channel: &SurfaceChannel, url: &Url) {
    let policy = coordinator.on_navigation_request(url);
    match policy {
        NavigationPolicy::Cancel => println!("  Cancel (handled by the shell)"),
        NavigationPolicy::Allow => println!("  Allow (passes through to the surface)"),
    }
    drain(channel);
}

fn drain(channel: &SurfaceChannel) {
    for command in channel.drain() {
        println!("  surface <- {command:?}");
    }
}
