use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};

const APPLICATION_DIR: &str = "toggoal";
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Directory used for logs. `$XDG_STATE_HOME/toggoal` or `$HOME/.local/state/toggoal`.
pub fn create_application_default_path() -> Result<PathBuf> {
    let mut path = env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| Path::new(&home).join(".local/state")))
        .map_err(|_| anyhow!("Couldn't find neither XDG_STATE_HOME nor HOME"))?;
    path.push(APPLICATION_DIR);

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}

/// Picks the configuration file. A `config.yml` in the working directory wins, then
/// `$XDG_CONFIG_HOME/toggoal/config.yml`, then `$HOME/.config/toggoal/config.yml`.
pub fn default_config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }

    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| Path::new(&home).join(".config")))
        .map(|dir| dir.join(APPLICATION_DIR).join(CONFIG_FILE_NAME))
        .unwrap_or(local)
}
