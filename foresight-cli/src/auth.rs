use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};

use crate::state::ensure_foresight_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub bearer_token: Option<String>,
}

fn auth_path() -> Result<std::path::PathBuf> {
    Ok(ensure_foresight_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// `FORESIGHT_TOKEN`, then the stored token.
pub fn resolve_token() -> Result<Option<String>> {
    if let Ok(t) = std::env::var("FORESIGHT_TOKEN") {
        if !t.trim().is_empty() {
            return Ok(Some(t.trim().to_string()));
        }
    }
    Ok(load_auth()?.bearer_token)
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn paste_token() -> Result<()> {
    let mut auth = load_auth()?;
    let token = prompt_secret("Paste API bearer token")?;
    let token = token.strip_prefix("Bearer ").unwrap_or(&token).trim().to_string();
    if token.is_empty() {
        bail!("no token entered");
    }
    if token.chars().any(char::is_whitespace) {
        bail!("token must not contain whitespace");
    }
    auth.bearer_token = Some(token);
    save_auth(&auth)?;
    println!("Saved token to {}", auth_path()?.display());
    Ok(())
}

pub fn clear_token() -> Result<()> {
    let mut auth = load_auth()?;
    if auth.bearer_token.take().is_none() {
        println!("No stored token.");
        return Ok(());
    }
    save_auth(&auth)?;
    println!("Removed stored token.");
    Ok(())
}
