// holonet-core/src/config.rs

//! Runtime configuration, loaded from the environment (optionally via a
//! `.env` file read by the frontend before calling [`RuntimeConfig::from_env`]).

use anyhow::{anyhow, Context, Result};
use std::env;
use url::Url;

pub const DEFAULT_MODEL: &str = "gpt-35-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_SWAPI_BASE_URL: &str = "https://swapi.dev/api/";
pub const DEFAULT_SEARCH_INDEX: &str = "swapi-vehicle-index";
pub const DEFAULT_MAX_TOOL_HOPS: usize = 1;

/// Connection settings for the search index collaborator. Only needed when
/// the vehicle search tool is registered.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: Url,
    pub api_key: String,
    pub index: String,
}

/// Everything the orchestrator and its collaborator clients need to run.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Base URL of the OpenAI-compatible service, e.g. `https://host/v1/`.
    pub openai_endpoint: Url,
    pub api_key: String,
    pub model_name: String,
    pub embedding_model: String,
    pub swapi_base_url: Url,
    pub search: Option<SearchConfig>,
    /// Maximum rounds of tool invocation + resubmission per turn.
    pub max_tool_hops: usize,
}

fn parse_base_url(raw: &str, var: &str) -> Result<Url> {
    // A trailing slash matters: Url::join drops the last path segment
    // of a slash-less base.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).with_context(|| format!("Invalid URL in {}: '{}'", var, raw))
}

impl RuntimeConfig {
    /// Reads configuration from the process environment.
    ///
    /// `OPENAI_ENDPOINT` and `OPENAI_KEY` are required. The search settings
    /// (`AZURE_SEARCH_ENDPOINT`, `AZURE_SEARCH_KEY`) are optional here and
    /// validated by the tool that needs them.
    pub fn from_env() -> Result<RuntimeConfig> {
        let endpoint = env::var("OPENAI_ENDPOINT")
            .map_err(|_| anyhow!("OPENAI_ENDPOINT is not set (set it in the environment or a .env file)"))?;
        let api_key = env::var("OPENAI_KEY")
            .map_err(|_| anyhow!("OPENAI_KEY is not set (set it in the environment or a .env file)"))?;
        if api_key.trim().is_empty() {
            return Err(anyhow!("OPENAI_KEY is empty"));
        }

        let openai_endpoint = parse_base_url(&endpoint, "OPENAI_ENDPOINT")?;

        let model_name =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let embedding_model = env::var("OPENAI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string());

        let swapi_base_url = match env::var("SWAPI_BASE_URL") {
            Ok(raw) => parse_base_url(&raw, "SWAPI_BASE_URL")?,
            Err(_) => Url::parse(DEFAULT_SWAPI_BASE_URL).expect("default swapi url is valid"),
        };

        let search = match (env::var("AZURE_SEARCH_ENDPOINT"), env::var("AZURE_SEARCH_KEY")) {
            (Ok(endpoint), Ok(key)) => Some(SearchConfig {
                endpoint: parse_base_url(&endpoint, "AZURE_SEARCH_ENDPOINT")?,
                api_key: key,
                index: env::var("AZURE_SEARCH_INDEX")
                    .unwrap_or_else(|_| DEFAULT_SEARCH_INDEX.to_string()),
            }),
            _ => None,
        };

        let max_tool_hops = match env::var("HOLONET_MAX_TOOL_HOPS") {
            Ok(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("HOLONET_MAX_TOOL_HOPS is not a number: '{}'", raw))?,
            Err(_) => DEFAULT_MAX_TOOL_HOPS,
        };

        tracing::info!(
            endpoint = %openai_endpoint,
            model = %model_name,
            max_tool_hops,
            search_configured = search.is_some(),
            "Loaded runtime configuration from environment."
        );

        Ok(RuntimeConfig {
            openai_endpoint,
            api_key,
            model_name,
            embedding_model,
            swapi_base_url,
            search,
            max_tool_hops,
        })
    }

    /// Full URL of the chat-completions endpoint.
    pub fn chat_completions_url(&self) -> Result<Url> {
        self.openai_endpoint
            .join("chat/completions")
            .context("Failed to build chat completions URL")
    }

    /// Full URL of the embeddings endpoint.
    pub fn embeddings_url(&self) -> Result<Url> {
        self.openai_endpoint
            .join("embeddings")
            .context("Failed to build embeddings URL")
    }

    /// The search settings, or an error naming the missing variables.
    pub fn search_config(&self) -> Result<&SearchConfig> {
        self.search.as_ref().ok_or_else(|| {
            anyhow!("Search is not configured (set AZURE_SEARCH_ENDPOINT and AZURE_SEARCH_KEY)")
        })
    }
}
