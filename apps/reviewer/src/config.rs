use std::{fs, path::Path, time::Duration};

use review_core::{Intent, ReviewEvent};
use serde::Deserialize;
use toml::{Table, Value};
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "reviewer.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server_url: String,
    pub default_folder: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            default_folder: None,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Command-line values win over everything else.
    pub fn apply_cli(&mut self, server_url: Option<String>, folder: Option<String>) {
        if let Some(server_url) = server_url {
            self.server_url = server_url;
        }
        if let Some(folder) = folder.as_deref().and_then(non_blank) {
            self.default_folder = Some(folder);
        }
    }

    /// Loads the default folder as soon as the review loop starts.
    pub fn startup_event(&self) -> Option<ReviewEvent> {
        self.default_folder
            .clone()
            .map(|folder| ReviewEvent::Intent(Intent::SubmitFolder(folder)))
    }
}

pub fn load_settings(config_path: &Path) -> Settings {
    load_settings_from(config_path, |key| std::env::var(key).ok())
}

/// Defaults, then the config file, then environment overrides.
pub fn load_settings_from<E>(config_path: &Path, env: E) -> Settings
where
    E: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match raw.parse::<Table>() {
            Ok(file_cfg) => apply_file(&mut settings, &file_cfg),
            Err(error) => {
                warn!(path = %config_path.display(), %error, "ignoring unreadable config file");
            }
        }
    }

    if let Some(v) = env("MOLSELECTOR_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("MOLSELECTOR_DEFAULT_FOLDER") {
        settings.default_folder = non_blank(&v);
    }
    if let Some(v) = env("MOLSELECTOR_REQUEST_TIMEOUT_SECS") {
        apply_timeout(&mut settings, &v);
    }

    settings
}

fn apply_file(settings: &mut Settings, file_cfg: &Table) {
    if let Some(v) = file_cfg.get("server_url") {
        match v.as_str() {
            Some(url) => settings.server_url = url.to_string(),
            None => warn!(value = %v, "ignoring non-string server_url"),
        }
    }
    if let Some(v) = file_cfg.get("default_folder") {
        match v.as_str() {
            Some(folder) => settings.default_folder = non_blank(folder),
            None => warn!(value = %v, "ignoring non-string default_folder"),
        }
    }
    match file_cfg.get("request_timeout_secs") {
        Some(Value::Integer(secs)) => match u64::try_from(*secs) {
            Ok(secs) => settings.request_timeout_secs = secs,
            Err(_) => warn!(value = secs, "ignoring negative request timeout"),
        },
        Some(Value::String(raw)) => apply_timeout(settings, raw),
        Some(other) => warn!(value = %other, "ignoring invalid request timeout"),
        None => {}
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn apply_timeout(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<u64>() {
        Ok(parsed) => settings.request_timeout_secs = parsed,
        Err(_) => warn!(value = raw, "ignoring invalid request timeout"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
