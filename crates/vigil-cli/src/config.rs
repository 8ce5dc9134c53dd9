use std::path::PathBuf;
use std::time::Duration;

use vigil_api::ApiConfig;

const DEFAULT_SUBDOMAIN: &str = "app";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Runtime settings read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub app_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub cache_file: PathBuf,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let required = |name: &str| {
            get(name).ok_or_else(|| eyre::eyre!("{name} must be set"))
        };

        let subdomain = get("DATADOG_SUBDOMAIN").unwrap_or_else(|| DEFAULT_SUBDOMAIN.into());
        let timeout_secs = match get("VIGIL_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| eyre::eyre!("invalid VIGIL_TIMEOUT_SECS {raw:?}: {e}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let cache_file = match get("VIGIL_CACHE_FILE") {
            Some(path) => PathBuf::from(path),
            None => default_cache_file()?,
        };

        Ok(Self {
            api_key: required("DATADOG_API_KEY")?,
            app_key: required("DATADOG_APP_KEY")?,
            base_url: format!("https://{subdomain}.datadoghq.com"),
            timeout: Duration::from_secs(timeout_secs),
            cache_file,
        })
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.api_key, &self.app_key)
            .with_base_url(&self.base_url)
            .with_timeout(self.timeout)
    }
}

fn default_cache_file() -> eyre::Result<PathBuf> {
    let base = dirs::cache_dir().ok_or_else(|| eyre::eyre!("no cache directory found"))?;
    Ok(base.join("vigil").join("details.json"))
}
