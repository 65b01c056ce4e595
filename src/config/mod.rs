//! Settings Module
//!
//! Loads the JSON settings file shared by the server and the workload client
//! and turns it into validated, typed settings. Settings are read once at
//! startup; any missing or malformed required key aborts startup with a
//! `ConfigError`.
//!
//! ## Submodules
//! - **`settings`**: the raw file shape and the per-binary typed settings.
//! - **`duration`**: parsing of delay/timeout strings.

pub mod duration;
pub mod settings;

pub use duration::parse_duration;
pub use settings::{
    BackendKind, BackendSettings, ClientSettings, ConfigError, MongoSettings, RawSettings,
    ServerSettings,
};

/// Settings file looked up when no `--settings` flag is given.
pub const DEFAULT_SETTINGS_FILE: &str = "appsettings.json";
