use garde::Validate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Key of the bot token inside the JSON secret document.
const TOKEN_SECRET_KEY: &str = "TELEGRAM_TOKEN";

#[derive(Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8443").
    #[serde(default = "default_bind_addr")]
    #[garde(length(min = 1))]
    pub bind_addr: String,

    /// Bot token, used when no secret file is configured
    #[garde(skip)]
    pub telegram_token: Option<String>,

    /// JSON secret document holding the bot token under `TELEGRAM_TOKEN`
    #[garde(skip)]
    pub telegram_secret_file: Option<PathBuf>,

    /// Public base URL Telegram delivers webhook calls to
    #[garde(url)]
    pub telegram_app_url: String,

    #[serde(default = "default_telegram_api_base")]
    #[garde(url)]
    pub telegram_api_base: String,

    /// Self-signed certificate uploaded with setWebhook
    #[garde(skip)]
    pub telegram_certificate: Option<PathBuf>,

    #[serde(default = "default_true")]
    #[garde(skip)]
    pub register_webhook: bool,

    /// Object-storage bucket photos are uploaded to
    #[garde(length(min = 3, max = 63))]
    pub bucket_name: String,

    #[serde(default = "default_s3_region")]
    #[garde(length(min = 1))]
    pub s3_region: String,

    /// Custom S3-compatible endpoint (path-style addressing)
    #[garde(url)]
    pub s3_endpoint: Option<String>,

    #[garde(skip)]
    pub s3_access_key: Option<String>,

    #[garde(skip)]
    pub s3_secret_key: Option<String>,

    /// Redis connection string of the job queue
    #[garde(custom(redis_url))]
    pub queue_url: String,

    #[serde(default = "default_queue_key")]
    #[garde(length(min = 1))]
    pub queue_key: String,

    /// Redis connection string of the result store (defaults to the queue's)
    #[garde(custom(optional_redis_url))]
    pub results_url: Option<String>,

    #[serde(default = "default_results_key_prefix")]
    #[garde(skip)]
    pub results_key_prefix: String,

    /// Directory photos are downloaded into before upload
    #[serde(default = "default_download_dir")]
    #[garde(skip)]
    pub download_dir: PathBuf,

    /// Local GIF path, or a Telegram file id / URL, shown while a photo is processed
    #[serde(default = "default_loading_animation")]
    #[garde(length(min = 1))]
    pub loading_animation: String,

    /// Quote the user's message in text replies
    #[serde(default)]
    #[garde(skip)]
    pub quote_replies: bool,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8443".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_true() -> bool {
    true
}

fn default_s3_region() -> String {
    "eu-west-3".to_string()
}

fn default_queue_key() -> String {
    "detection:jobs".to_string()
}

fn default_results_key_prefix() -> String {
    "predictions:".to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_loading_animation() -> String {
    "loading.gif".to_string()
}

fn redis_url(value: &str, _ctx: &()) -> garde::Result {
    if value.starts_with("redis://") || value.starts_with("rediss://") {
        Ok(())
    } else {
        Err(garde::Error::new("must be a redis:// or rediss:// URL"))
    }
}

fn optional_redis_url(value: &Option<String>, ctx: &()) -> garde::Result {
    value.as_deref().map_or(Ok(()), |url| redis_url(url, ctx))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Redis URL of the result store.
    pub fn results_url(&self) -> &str {
        self.results_url.as_deref().unwrap_or(&self.queue_url)
    }

    /// Load the bot token, preferring the secret file over the plain variable.
    pub fn load_telegram_token(&self) -> Result<String, ConfigError> {
        if let Some(path) = &self.telegram_secret_file {
            return read_token_secret(path);
        }
        match self.telegram_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(ConfigError::MissingToken),
        }
    }
}

fn read_token_secret(path: &Path) -> Result<String, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::SecretRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_token_secret(&raw)
}

/// Extract the bot token from a JSON secret document.
pub fn parse_token_secret(raw: &str) -> Result<String, ConfigError> {
    let secret: serde_json::Value = serde_json::from_str(raw)?;
    secret
        .get(TOKEN_SECRET_KEY)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingToken)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment error: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] garde::Report),

    #[error("Failed to read secret {}: {source}", path.display())]
    SecretRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Secret is not valid JSON: {0}")]
    SecretFormat(#[from] serde_json::Error),

    #[error("Telegram token not configured (set TELEGRAM_SECRET_FILE or TELEGRAM_TOKEN)")]
    MissingToken,
}
