//! Configuration types for OCR conversion.
//!
//! The API credential is an explicit [`OcrConfig`] field handed to
//! [`crate::client::OcrClient::new`] — the client never reads the
//! environment itself. [`OcrConfig::from_env`] is the single place the
//! `MISTRAL_API_KEY` variable is consulted, which keeps tests free to inject
//! fake credentials without touching process-wide state.

use crate::error::Ocr2MdError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable holding the Mistral API credential.
pub const API_KEY_VAR: &str = "MISTRAL_API_KEY";

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";

/// Default OCR model.
pub const DEFAULT_MODEL: &str = "mistral-ocr-latest";

/// Configuration for the OCR client.
///
/// # Example
/// ```rust
/// use ocr2md::OcrConfig;
///
/// let config = OcrConfig::new("sk-test")
///     .with_model("mistral-ocr-latest")
///     .with_timeout_secs(120);
/// ```
#[derive(Clone)]
pub struct OcrConfig {
    /// API credential sent as a bearer token.
    pub api_key: String,

    /// API endpoint, without a trailing slash. Default: `https://api.mistral.ai`.
    pub base_url: String,

    /// OCR model identifier. Default: `mistral-ocr-latest`.
    pub model: String,

    /// Per-request timeout in seconds. Default: 300.
    ///
    /// OCR on a long document routinely takes more than a minute, so the
    /// default is far above reqwest's usual 30 s.
    pub timeout_secs: u64,
}

impl OcrConfig {
    /// Configuration with the given credential and all defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 300,
        }
    }

    /// Read the credential from `MISTRAL_API_KEY`.
    ///
    /// Fails with [`Ocr2MdError::MissingApiKey`] before any I/O when the
    /// variable is unset or empty.
    pub fn from_env() -> Result<Self, Ocr2MdError> {
        Self::from_env_var(API_KEY_VAR)
    }

    /// Read the credential from a named environment variable.
    pub fn from_env_var(var: &str) -> Result<Self, Ocr2MdError> {
        match std::env::var(var) {
            Ok(key) if !key.is_empty() => Ok(Self::new(key)),
            _ => Err(Ocr2MdError::MissingApiKey {
                var: var.to_string(),
            }),
        }
    }

    /// Override the API endpoint; a trailing slash is trimmed.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url: String = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Override the OCR model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Which result artefacts to write to the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Write the assembled markdown document (default).
    #[default]
    Markdown,
    /// Write the raw API response as pretty-printed JSON.
    Json,
    /// Write both artefacts.
    Both,
}

impl OutputFormat {
    /// True when a markdown file should be written.
    pub fn wants_markdown(self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::Both)
    }

    /// True when a raw-JSON dump should be written.
    pub fn wants_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Ocr2MdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "both" => Ok(OutputFormat::Both),
            other => Err(Ocr2MdError::InvalidConfig(format!(
                "Unknown output format '{other}' (expected markdown, json, or both)"
            ))),
        }
    }
}
