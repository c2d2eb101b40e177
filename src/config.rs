use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_CART_TTL_SECS: u64 = 3 * 60;
pub const DEFAULT_CART_WARNING_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub cart: CartConfig,
}

/// Lifetime settings for the client-held cart.
#[derive(Debug, Clone)]
pub struct CartConfig {
    pub storage_dir: PathBuf,
    pub ttl: Duration,
    pub warning_window: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".cart"),
            ttl: Duration::from_secs(DEFAULT_CART_TTL_SECS),
            warning_window: Duration::from_secs(DEFAULT_CART_WARNING_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        Ok(Self {
            port,
            database_url,
            host,
            cart: CartConfig::from_env()?,
        })
    }
}

impl CartConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let storage_dir = env::var("CART_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_dir);
        let ttl = secs_from_env("CART_TTL_SECS")?.unwrap_or(defaults.ttl);
        let warning_window = secs_from_env("CART_WARNING_SECS")?.unwrap_or(defaults.warning_window);
        if warning_window >= ttl {
            anyhow::bail!("CART_WARNING_SECS must be shorter than CART_TTL_SECS");
        }
        Ok(Self {
            storage_dir,
            ttl,
            warning_window,
        })
    }
}

fn secs_from_env(key: &str) -> anyhow::Result<Option<Duration>> {
    match env::var(key) {
        Ok(raw) => {
            let secs = raw
                .parse::<u64>()
                .map_err(|err| anyhow::anyhow!("{key} must be a whole number of seconds: {err}"))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}
