use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$FORESIGHT_HOME`, or `~/.foresight`.
pub fn foresight_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FORESIGHT_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".foresight"))
}

pub fn ensure_foresight_home() -> Result<PathBuf> {
    let dir = foresight_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn ensure_cache_dir() -> Result<PathBuf> {
    let dir = ensure_foresight_home()?.join("cache");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
