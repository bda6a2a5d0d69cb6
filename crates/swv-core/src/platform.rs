//! Platform service collaborators.
//!
//! Everything the bridge asks of the host platform (opening URLs, share
//! sheets, notices, dialogs, notifications, location, pickers) sits behind
//! the [`PlatformServices`] trait. The core never touches an OS API
//! directly; hosts supply an implementation, and [`NullPlatform`] stands in
//! where no platform is wired up.
//!
//! An unavailable capability is not an error condition for the bridge:
//! callers treat `Err` as "cannot handle" and degrade (a navigation falls
//! through, a selection resolves empty).

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;
use url::Url;

/// Failure of a platform capability.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The capability is not provided by this platform implementation.
    #[error("platform capability unavailable: {0}")]
    Unavailable(&'static str),
    /// The capability exists but the request failed.
    #[error("platform request failed: {0}")]
    Failed(String),
}

/// A geographic fix returned by the location service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Permissions the shell may request at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Notifications,
    Location,
}

/// A source the resource picker can draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerSource {
    Camera,
    PhotoLibrary,
    FileBrowser,
}

/// Restricts what a picker may offer, per the page's request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFilter {
    /// Any file type.
    #[default]
    Any,
    /// Still images only.
    Images,
    /// Video only.
    Videos,
}

/// Capabilities the bridge requires from the host platform.
///
/// Picker presentations are fire-and-forget: the platform shows its UI and
/// the host later reports the outcome back to the coordinator
/// (`on_source_chosen` / `on_picker_result`). Nothing here may block the
/// caller.
pub trait PlatformServices: Send + Sync {
    /// Whether the platform can open `url` outside the surface.
    fn can_open_url(&self, url: &Url) -> bool;

    /// Open `url` outside the surface (system browser, dialer, mail).
    fn open_url(&self, url: &Url) -> Result<(), PlatformError>;

    /// Present the system share sheet for `text`.
    fn share_text(&self, text: &str) -> Result<(), PlatformError>;

    /// Present the print dialog for the current document.
    fn present_print(&self) -> Result<(), PlatformError>;

    /// Show a transient notice (toast) to the user.
    fn show_notice(&self, message: &str) -> Result<(), PlatformError>;

    /// Show a modal dialog with a title and message.
    fn show_dialog(&self, title: &str, message: &str) -> Result<(), PlatformError>;

    /// Post a local notification.
    fn post_notification(&self, title: &str, body: &str) -> Result<(), PlatformError>;

    /// Ask the platform to show its app-review prompt.
    fn request_review(&self) -> Result<(), PlatformError>;

    /// Query the current location.
    fn current_location(&self) -> Result<Coordinates, PlatformError>;

    /// Request a runtime permission from the user.
    fn request_permission(&self, permission: Permission) -> Result<(), PlatformError>;

    /// Register the process for push messaging.
    fn register_push_messaging(&self) -> Result<(), PlatformError>;

    /// Present a sheet letting the user choose among picker sources.
    fn present_source_choice(&self, sources: &[PickerSource]) -> Result<(), PlatformError>;

    /// Present the picker for one source.
    fn present_picker(
        &self,
        source: PickerSource,
        filter: SourceFilter,
        multiple: bool,
    ) -> Result<(), PlatformError>;
}

/// Platform implementation that provides nothing.
///
/// Every capability reports unavailable; `can_open_url` is always false.
#[derive(Debug, Default)]
pub struct NullPlatform;

impl PlatformServices for NullPlatform {
    fn can_open_url(&self, url: &Url) -> bool {
        debug!(%url, "null platform cannot open URLs");
        false
    }

    fn open_url(&self, _url: &Url) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("open_url"))
    }

    fn share_text(&self, _text: &str) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("share_text"))
    }

    fn present_print(&self) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("present_print"))
    }

    fn show_notice(&self, _message: &str) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("show_notice"))
    }

    fn show_dialog(&self, _title: &str, _message: &str) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("show_dialog"))
    }

    fn post_notification(&self, _title: &str, _body: &str) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("post_notification"))
    }

    fn request_review(&self) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("request_review"))
    }

    fn current_location(&self) -> Result<Coordinates, PlatformError> {
        Err(PlatformError::Unavailable("current_location"))
    }

    fn request_permission(&self, _permission: Permission) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("request_permission"))
    }

    fn register_push_messaging(&self) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("register_push_messaging"))
    }

    fn present_source_choice(&self, _sources: &[PickerSource]) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("present_source_choice"))
    }

    fn present_picker(
        &self,
        _source: PickerSource,
        _filter: SourceFilter,
        _multiple: bool,
    ) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("present_picker"))
    }
}

/// Where the platform stores files for the bridge.
///
/// The picker copies selections into `selection_dir` (wiped with the
/// process); downloads land in `download_dir` (persistent).
#[derive(Debug, Clone)]
pub struct StorageLocations {
    pub selection_dir: PathBuf,
    pub download_dir: PathBuf,
}

impl StorageLocations {
    /// Default locations: the system temp dir for selections and the user
    /// download directory (falling back to temp) for downloads.
    pub fn resolve() -> Self {
        let selection_dir = std::env::temp_dir().join("swv-selections");
        let download_dir = dirs::download_dir().unwrap_or_else(std::env::temp_dir);
        Self {
            selection_dir,
            download_dir,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording platform double shared by module tests.

    use super::*;
    use parking_lot::Mutex;

    /// One observed platform interaction.
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum PlatformCall {
        OpenUrl(String),
        ShareText(String),
        Print,
        Notice(String),
        Dialog(String, String),
        Notification(String, String),
        Review,
        Location,
        Permission(Permission),
        RegisterPush,
        SourceChoice(Vec<PickerSource>),
        Picker(PickerSource, SourceFilter, bool),
    }

    /// Records every call; openability and location are configurable.
    #[derive(Default)]
    pub(crate) struct RecordingPlatform {
        pub(crate) calls: Mutex<Vec<PlatformCall>>,
        pub(crate) openable_schemes: Vec<String>,
        pub(crate) location: Option<Coordinates>,
    }

    impl RecordingPlatform {
        pub(crate) fn opening_everything() -> Self {
            Self {
                openable_schemes: vec![
                    "http".into(),
                    "https".into(),
                    "tel".into(),
                    "sms".into(),
                    "mailto".into(),
                ],
                ..Self::default()
            }
        }

        pub(crate) fn calls(&self) -> Vec<PlatformCall> {
            self.calls.lock().clone()
        }

        fn record(&self, call: PlatformCall) {
            self.calls.lock().push(call);
        }
    }

    impl PlatformServices for RecordingPlatform {
        fn can_open_url(&self, url: &Url) -> bool {
            self.openable_schemes.iter().any(|s| s == url.scheme())
        }

        fn open_url(&self, url: &Url) -> Result<(), PlatformError> {
            self.record(PlatformCall::OpenUrl(url.to_string()));
            Ok(())
        }

        fn share_text(&self, text: &str) -> Result<(), PlatformError> {
            self.record(PlatformCall::ShareText(text.to_string()));
            Ok(())
        }

        fn present_print(&self) -> Result<(), PlatformError> {
            self.record(PlatformCall::Print);
            Ok(())
        }

        fn show_notice(&self, message: &str) -> Result<(), PlatformError> {
            self.record(PlatformCall::Notice(message.to_string()));
            Ok(())
        }

        fn show_dialog(&self, title: &str, message: &str) -> Result<(), PlatformError> {
            self.record(PlatformCall::Dialog(title.to_string(), message.to_string()));
            Ok(())
        }

        fn post_notification(&self, title: &str, body: &str) -> Result<(), PlatformError> {
            self.record(PlatformCall::Notification(
                title.to_string(),
                body.to_string(),
            ));
            Ok(())
        }

        fn request_review(&self) -> Result<(), PlatformError> {
            self.record(PlatformCall::Review);
            Ok(())
        }

        fn current_location(&self) -> Result<Coordinates, PlatformError> {
            self.record(PlatformCall::Location);
            self.location
                .ok_or(PlatformError::Unavailable("current_location"))
        }

        fn request_permission(&self, permission: Permission) -> Result<(), PlatformError> {
            self.record(PlatformCall::Permission(permission));
            Ok(())
        }

        fn register_push_messaging(&self) -> Result<(), PlatformError> {
            self.record(PlatformCall::RegisterPush);
            Ok(())
        }

        fn present_source_choice(&self, sources: &[PickerSource]) -> Result<(), PlatformError> {
            self.record(PlatformCall::SourceChoice(sources.to_vec()));
            Ok(())
        }

        fn present_picker(
            &self,
            source: PickerSource,
            filter: SourceFilter,
            multiple: bool,
        ) -> Result<(), PlatformError> {
            self.record(PlatformCall::Picker(source, filter, multiple));
            Ok(())
        }
    }
}
