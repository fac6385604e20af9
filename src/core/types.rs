//! Provider configuration types.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::ScoreError;

/// The JSON request/response shape a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// `{"contents":[{"parts":[{"text": ..}]}]}` in,
    /// `candidates[0].content.parts[0].text` out.
    Contents,

    /// `{"messages":[{"role":"user","content": ..}]}` in,
    /// `choices[0].message.content` out.
    ChatMessages,
}

impl WireFormat {
    /// Returns the configuration name of this format.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Contents => "contents",
            Self::ChatMessages => "chat",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WireFormat {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contents" | "content" => Ok(Self::Contents),
            "chat" | "messages" | "chat_messages" => Ok(Self::ChatMessages),
            other => Err(ScoreError::configuration(format!(
                "unknown wire format '{other}' (expected 'contents' or 'chat')"
            ))),
        }
    }
}

/// Static configuration for one scoring provider.
///
/// Loaded once at startup and never mutated afterwards. The API key is kept
/// secret and is redacted from `Debug` output.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Stable provider name, e.g. "alpha".
    pub name: String,

    /// API key (kept secret).
    pub api_key: SecretString,

    /// Full endpoint URL the request is POSTed to.
    pub endpoint: String,

    /// Whether this provider may be selected.
    pub enabled: bool,

    /// Request/response shape.
    pub format: WireFormat,

    /// Model identifier sent with chat-style requests.
    pub model: Option<String>,
}

impl ProviderConfig {
    /// Creates an enabled provider configuration.
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        format: WireFormat,
    ) -> Self {
        Self {
            name: name.into(),
            api_key: SecretString::new(api_key.into().into()),
            endpoint: endpoint.into(),
            enabled: true,
            format,
            model: None,
        }
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Enables or disables the provider.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Checks that this provider can actually be called.
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.name.trim().is_empty() {
            return Err(ScoreError::configuration("provider name must not be empty"));
        }
        if !self.enabled {
            return Err(ScoreError::configuration(format!(
                "provider '{}' is disabled",
                self.name
            )));
        }
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ScoreError::configuration(format!(
                "missing API key for provider '{}'",
                self.name
            )));
        }
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ScoreError::configuration(format!(
                "endpoint for provider '{}' must be an http(s) URL",
                self.name
            )));
        }
        Ok(())
    }
}
