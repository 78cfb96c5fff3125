//! On-disk cache for the daily cash-flow forecast.
//!
//! The forecast changes at most a few times a day, so a copy younger than
//! `cache.max_age_minutes` is served instead of hitting the endpoint again.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use foresight_core::DailyClosingBalance;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::state::ensure_cache_dir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedForecast {
    pub fetched_at_utc: DateTime<Utc>,
    pub daily_cashflow: Vec<DailyClosingBalance>,
}

impl CachedForecast {
    /// A timestamp in the future (clock skew, edited file) is never fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let age = now - self.fetched_at_utc;
        age >= Duration::zero() && age < max_age
    }
}

/// File-name-safe key for an email address.
pub fn cache_key(email: &str) -> String {
    email
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '.' | '-' => c,
            _ => '_',
        })
        .collect()
}

fn cache_file(dir: &Path, email: &str) -> PathBuf {
    dir.join(format!("forecast-{}.json", cache_key(email)))
}

/// Cached forecast, if one is still fresh. Any cache problem is a miss.
pub fn load_fresh(email: &str, now: DateTime<Utc>, max_age: Duration) -> Option<CachedForecast> {
    match ensure_cache_dir() {
        Ok(dir) => load_fresh_in(&dir, email, now, max_age),
        Err(e) => {
            warn!(error = %e, "forecast cache unavailable");
            None
        }
    }
}

/// Best effort: a cache that cannot be written only costs a refetch next time.
pub fn store(email: &str, daily_cashflow: &[DailyClosingBalance], now: DateTime<Utc>) {
    let result = ensure_cache_dir().and_then(|dir| store_in(&dir, email, daily_cashflow, now));
    if let Err(e) = result {
        warn!(error = %e, "could not write forecast cache");
    }
}

pub fn load_fresh_in(
    dir: &Path,
    email: &str,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Option<CachedForecast> {
    let p = cache_file(dir, email);
    if !p.exists() {
        return None;
    }
    let cached: CachedForecast = match fs::read_to_string(&p)
        .with_context(|| format!("read {}", p.display()))
        .and_then(|s| serde_json::from_str(&s).context("parse forecast cache"))
    {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %p.display(), error = %e, "ignoring unreadable forecast cache");
            return None;
        }
    };
    if !cached.is_fresh(now, max_age) {
        debug!(fetched_at = %cached.fetched_at_utc, "forecast cache is stale");
        return None;
    }
    Some(cached)
}

pub fn store_in(
    dir: &Path,
    email: &str,
    daily_cashflow: &[DailyClosingBalance],
    now: DateTime<Utc>,
) -> Result<()> {
    let p = cache_file(dir, email);
    let cached = CachedForecast {
        fetched_at_utc: now,
        daily_cashflow: daily_cashflow.to_vec(),
    };
    let s = serde_json::to_string(&cached)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
