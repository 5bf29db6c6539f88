use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub booking_api_base_url: String,
    pub booking_center_code: String,
    pub payments_base_url: Option<String>,
    pub stripe_publishable_key: Option<String>,
    pub stripe_tenant: String,
    pub http_timeout_secs: u64,
    pub availability_cache_secs: u64,
    pub flow_session_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let booking_api_base_url = env::var("BOOKING_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let booking_center_code =
            env::var("BOOKING_CENTER_CODE").unwrap_or_else(|_| "MA1".to_string());

        // Payments config is optional; when absent the checkout degrades to a
        // "payments disabled" response instead of failing at startup.
        let payments_base_url = env::var("PAYMENTS_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string());

        let stripe_publishable_key = env::var("STRIPE_PUBLISHABLE_KEY").ok();

        let stripe_tenant = env::var("STRIPE_TENANT").unwrap_or_else(|_| "default".to_string());

        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30)
            .clamp(10, 30);

        let availability_cache_secs = env::var("AVAILABILITY_CACHE_SECS")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);

        let flow_session_ttl_minutes = env::var("FLOW_SESSION_TTL_MINUTES")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        Ok(Config {
            server_host,
            server_port,
            booking_api_base_url,
            booking_center_code,
            payments_base_url,
            stripe_publishable_key,
            stripe_tenant,
            http_timeout_secs,
            availability_cache_secs,
            flow_session_ttl_minutes,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn payments_enabled(&self) -> bool {
        self.payments_base_url.is_some() && self.stripe_publishable_key.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
}
