use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::kernel::context::DEFAULT_REWIND_STEP_SECS;

pub const CONFIG_PATH_ENV: &str = "SEGSYNC_CONFIG";
pub const ENV_PREFIX: &str = "SEGSYNC";

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    /// Origin of the transcript server, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Path of the edit page being worked on, e.g. `/edit/42`. The
    /// transcription id is its last component.
    pub edit_path: String,
    /// Read the page from disk instead of fetching `edit_path`.
    #[serde(default)]
    pub page_path: Option<PathBuf>,
    pub request_timeout_ms: u64,
    /// Overrides the page's autoplay checkbox when set.
    #[serde(default)]
    pub autoplay: Option<bool>,
    pub rewind_step_secs: f64,
}

impl EditorConfig {
    /// Defaults, then the file named by `SEGSYNC_CONFIG` (if any), then
    /// `SEGSYNC__*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::load_from(path.as_deref().map(Path::new))
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("base_url", "http://localhost:8000")?
            .set_default("edit_path", "/edit/1")?
            .set_default("request_timeout_ms", 10_000_i64)?
            .set_default("rewind_step_secs", DEFAULT_REWIND_STEP_SECS)?;

        let builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder,
        };

        builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
