//! Configuration loading.
//!
//! Layered the usual way: built-in defaults, then an optional TOML file,
//! then `CASTER_`-prefixed environment variables (`__` as the section
//! separator, e.g. `CASTER_OPENAI__MODEL`).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::openai::{self, OpenAiConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub openai: OpenAiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiSettings {
    /// Full URL of the completions endpoint.
    pub endpoint: String,
    /// Bearer credential. Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default)]
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// System prompt seeding the conversation.
    pub system_prompt: Option<String>,
    /// Sampling temperature, omitted from requests when unset.
    pub temperature: Option<f32>,
    /// Per-call deadline in seconds; no deadline when unset.
    pub request_timeout_secs: Option<u64>,
    /// Stream assistant replies to viewers as they are generated.
    pub stream: bool,
}

impl OpenAiSettings {
    pub fn client_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("server.bind", "127.0.0.1:8080")?
            .set_default("openai.endpoint", openai::DEFAULT_ENDPOINT)?
            .set_default("openai.model", "gpt-3.5-turbo")?
            .set_default(
                "openai.system_prompt",
                "You are a friendly and helpful assistant.",
            )?
            .set_default("openai.stream", false)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        let mut settings: Settings = builder
            .add_source(
                Environment::with_prefix("CASTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("loading configuration")?
            .try_deserialize()
            .context("parsing configuration")?;

        // The original deployment read its credential from OPENAI_API_KEY;
        // keep honoring it when no explicit key is configured.
        if settings.openai.api_key.is_empty() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                settings.openai.api_key = key;
            }
        }

        Ok(settings)
    }
}
