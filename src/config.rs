//! Service configuration, read from the environment at startup.

use anyhow::{Context, Result, anyhow};
use std::{env, fmt::Display, fs::read_to_string, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::catalog::language::Language;
use crate::upstream::openfoodfacts::DEFAULT_ENDPOINT;

#[derive(Debug, Clone)]
pub enum StorageConfig {
    Local {
        data_dir: PathBuf,
    },
    Supabase {
        url: String,
        bucket: String,
        service_key: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    pub store_timeout: Duration,
    pub openfoodfacts_url: String,
    pub warmup_langs: Vec<Language>,
    /// Zero disables the periodic cache report.
    pub stats_interval: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        let storage = match try_load::<String>("STORAGE_BACKEND", "local")?.as_str() {
            "local" => StorageConfig::Local {
                data_dir: try_load("DATA_DIR", "data/foodData")?,
            },
            "supabase" => StorageConfig::Supabase {
                url: required("SUPABASE_URL")?,
                bucket: try_load("STORAGE_BUCKET", "food-json")?,
                service_key: secret("SUPABASE_SERVICE_ROLE_KEY")?,
            },
            other => return Err(anyhow!("Unknown STORAGE_BACKEND '{other}' (expected local or supabase)")),
        };

        Ok(Self {
            bind_addr: try_load("BIND_ADDR", "0.0.0.0:3000")?,
            storage,
            store_timeout: Duration::from_millis(try_load("STORE_TIMEOUT_MS", "30000")?),
            openfoodfacts_url: try_load("OPENFOODFACTS_URL", DEFAULT_ENDPOINT)?,
            warmup_langs: parse_languages(&try_load::<String>("WARMUP_LANGS", "")?)?,
            stats_interval: Duration::from_secs(try_load("STATS_INTERVAL_SECS", "300")?),
        })
    }
}

/// Comma-separated language codes; blanks are skipped and duplicates folded.
pub fn parse_languages(raw: &str) -> Result<Vec<Language>> {
    let mut langs = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let lang: Language = code
            .parse()
            .with_context(|| format!("Invalid language '{code}' in WARMUP_LANGS"))?;
        if !langs.contains(&lang) {
            langs.push(lang);
        }
    }
    Ok(langs)
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value '{raw}': {e}"))
}

fn required(key: &str) -> Result<String> {
    var(key).ok_or_else(|| anyhow!("{key} must be set"))
}

/// Reads a secret from the environment, falling back to `/run/secrets/<name>`.
fn secret(name: &str) -> Result<String> {
    if let Some(value) = var(name) {
        return Ok(value.trim().to_string());
    }

    let path = format!("/run/secrets/{name}");
    warn!("{name} not set, reading {path}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .with_context(|| format!("Failed to read secret {name}"))
}

#[cfg(test)]
mod tests {
    use super::parse_languages;
    use crate::catalog::language::Language;

    #[test]
    fn test_parse_languages() {
        assert!(parse_languages("").unwrap().is_empty());
        assert_eq!(
            parse_languages(" kr, EN ,us,,fr").unwrap(),
            vec![Language::Kr, Language::Us, Language::Fr]
        );
        assert!(parse_languages("kr,xx").is_err());
    }
}
