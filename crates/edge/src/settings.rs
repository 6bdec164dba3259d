// crates/edge/src/settings.rs

use crate::Error;
use domain::setting::Settings;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.toml";

/// Load settings from `<dir>/settings.toml`.
#[tracing::instrument(skip_all)]
pub fn load_settings(dir: &Path) -> Result<Settings, Error> {
    // Ensure directory exists
    if !dir.is_dir() {
        return Err(Error::Config(format!(
            "Settings directory does not exist: {}",
            dir.display()
        )));
    }

    let mut path = PathBuf::from(dir);
    path.push(SETTINGS_FILE);

    if !path.exists() {
        return Err(Error::Config(format!(
            "{SETTINGS_FILE} not found at {}",
            path.display()
        )));
    }

    let text = std::fs::read_to_string(&path).map_err(|err| {
        Error::Config(format!("Failed reading {}: {}", path.display(), err))
    })?;

    let settings: Settings = toml::from_str(&text).map_err(|err| {
        Error::Config(format!(
            "Invalid {SETTINGS_FILE} at {}: {}",
            path.display(),
            err
        ))
    })?;

    if !settings.admin.path.starts_with('/') {
        return Err(Error::Config(format!(
            "admin.path must start with '/': {:?}",
            settings.admin.path
        )));
    }

    Ok(settings)
}
