use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "UBLUE_SCANNER_CONFIG";

/// Get the config file to load, if any
///
/// An explicit path (from `--config` or `UBLUE_SCANNER_CONFIG`) is always
/// returned, so a missing file is reported by the loader. The default
/// `~/.config/ublue-scanner/config.yaml` (on Linux) is only returned if it exists.
pub fn get_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    resolve_config_path(explicit, dirs::config_dir())
}

fn resolve_config_path(explicit: Option<PathBuf>, config_dir: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path);
    }

    let default = match config_dir {
        Some(dir) => dir.join("ublue-scanner").join("config.yaml"),
        // Fallback to current directory
        None => PathBuf::from("config.yaml"),
    };

    default.exists().then_some(default)
}

/// Loads `KEY=value` pairs from `.env` in `dir` into the environment
///
/// Variables that are already set keep their value. Returns the loaded file,
/// or `None` when there is no `.env`.
pub fn load_env_file(dir: &Path) -> Result<Option<PathBuf>, dotenvy::Error> {
    let path = dir.join(".env");
    match dotenvy::from_path(&path) {
        Ok(()) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
