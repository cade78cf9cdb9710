//! Client configuration

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Backend functions configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Functions base URL (e.g., "http://localhost:8888/.netlify/functions")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Stock catalog function
    pub catalog_path: String,

    /// Discount table function
    pub discounts_path: String,

    /// Order sink function
    pub orders_path: String,
}

impl ClientConfig {
    /// Create a configuration with the standard function names
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
            catalog_path: "api-estoque".to_string(),
            discounts_path: "api-descontos".to_string(),
            orders_path: "api-pedidos".to_string(),
        }
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Hosted roster database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterConfig {
    /// Project URL (e.g., "https://xyz.supabase.co")
    pub url: String,

    /// Public anon key, sent as `apikey` and as the bearer token
    pub anon_key: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl RosterConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}
