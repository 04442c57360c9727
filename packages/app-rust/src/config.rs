//! Application configuration.
//!
//! Built once at startup (by `fleetctl` from command-line arguments and
//! environment) and handed to constructors. Nothing reads settings from a
//! global.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for the application core.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub paging: PagingConfig,
    /// AI analytics are disabled when `None`.
    pub ai: Option<AiConfig>,
    pub logging: LogConfig,
    /// JSON snapshot the store is loaded from and saved to. In-memory only when `None`.
    pub data_file: Option<PathBuf>,
}

/// Settings for the standard handler pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Deadline applied by the timeout handler to each operation.
    pub operation_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            operation_timeout: Duration::from_secs(30),
        }
    }
}

/// Page sizes for list operations.
#[derive(Debug, Clone)]
pub struct PagingConfig {
    /// Size used when the caller does not ask for one.
    pub default_page_size: u32,
    /// Upper bound for caller-supplied sizes.
    pub max_page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 200,
        }
    }
}

/// Chat-completion endpoint used for fleet analytics.
///
/// No `Default` impl because the API key has no sensible default.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Base URL of an OpenAI-compatible API, without the trailing path.
    pub base_url: String,
    /// Bearer credential.
    pub api_key: String,
    pub model: String,
    pub request_timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl AiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    /// Config for the default endpoint and model with the given key.
    #[must_use]
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(60),
            max_tokens: 800,
            temperature: 0.3,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}
