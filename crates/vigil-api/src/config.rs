use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://app.datadoghq.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the client needs to talk to the remote service.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub app_key: String,
    /// Applied both as connect and as whole-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            app_key: app_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
