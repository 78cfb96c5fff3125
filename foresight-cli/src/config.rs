use anyhow::{Context, Result, anyhow};
use chrono::Duration;
use foresight_core::{DEFAULT_TIMEZONE, ImpactPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_foresight_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiSection,
    pub display: DisplaySection,
    pub impact: ImpactSection,
    pub cache: CacheSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub user_id: Option<String>,
    /// Keys the cash-flow forecast endpoint.
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// IANA timezone that decides what "today" is.
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactSection {
    pub tight_margin: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub max_age_minutes: i64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            user_id: None,
            user_email: None,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl Default for ImpactSection {
    fn default() -> Self {
        Self {
            tight_margin: ImpactPolicy::default().tight_margin,
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self { max_age_minutes: 60 }
    }
}

impl Config {
    /// `FORESIGHT_BASE_URL` wins over the file.
    pub fn base_url(&self) -> String {
        std::env::var("FORESIGHT_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.api.base_url.clone())
    }

    /// Errors instead of panicking when the configured age overflows a duration.
    pub fn cache_max_age(&self) -> Result<Duration> {
        Duration::try_minutes(self.cache.max_age_minutes).ok_or_else(|| {
            anyhow!(
                "cache.max_age_minutes = {} is out of range",
                self.cache.max_age_minutes
            )
        })
    }

    pub fn impact_policy(&self) -> ImpactPolicy {
        ImpactPolicy {
            tight_margin: self.impact.tight_margin,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_foresight_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    println!("Set [api] user_id and user_email, then run: foresight upcoming");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = parse_config(
            r#"
            [api]
            user_id = "u-42"
            user_email = "sam@example.com"

            [impact]
            tight_margin = 750.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.api.user_id.as_deref(), Some("u-42"));
        assert_eq!(cfg.api.base_url, "http://localhost:3000");
        assert_eq!(cfg.display.timezone, "America/Chicago");
        assert_eq!(cfg.impact_policy().tight_margin, 750.0);
        assert_eq!(cfg.cache.max_age_minutes, 60);
    }

    #[test]
    fn default_round_trips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let cfg = parse_config(&s).unwrap();
        assert_eq!(cfg.impact.tight_margin, 500.0);
    }

    #[test]
    fn huge_cache_age_is_an_error_not_a_panic() {
        let cfg = parse_config(&format!("[cache]\nmax_age_minutes = {}\n", i64::MAX / 10)).unwrap();
        assert!(cfg.cache_max_age().is_err());

        let cfg = parse_config("[cache]\nmax_age_minutes = 90\n").unwrap();
        assert_eq!(cfg.cache_max_age().unwrap(), Duration::minutes(90));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(parse_config("[api\nbase_url = 3").is_err());
    }
}
