// holonet-core/src/tools/vehicle_search.rs

//! Tool B: hybrid vector/semantic search over the vehicle index.
//!
//! The query is embedded first, then submitted as a combined full-text +
//! semantic + vector nearest-neighbor query. The tool result is the
//! newline-separated summaries of the top matches.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::Tool;
use crate::api;
use crate::config::RuntimeConfig;
use crate::errors::ToolCallError;
use crate::models::tools::{ToolDefinition, ToolInput};
use crate::search::SearchClient;

pub const VEHICLE_SEARCH_TOOL_NAME: &str = "call_vehicle_search";

const VECTOR_FIELD: &str = "summary_vector";
const K_NEAREST_NEIGHBORS: u32 = 3;
const TOP_RESULTS: u32 = 3;

pub struct VehicleSearch {
    http_client: Client,
    config: RuntimeConfig,
    search_client: SearchClient,
}

impl VehicleSearch {
    pub fn new(http_client: Client, config: RuntimeConfig, search_client: SearchClient) -> Self {
        Self {
            http_client,
            config,
            search_client,
        }
    }
}

#[async_trait]
impl Tool for VehicleSearch {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::single_string_param(
            VEHICLE_SEARCH_TOOL_NAME,
            "Searches for a vehicle in Star Wars.",
            "search_query",
            "The search query",
        )
    }

    async fn invoke(&self, input: ToolInput) -> Result<String> {
        let search_query = input.required_str("search_query").ok_or_else(|| {
            ToolCallError::invalid_arguments(
                VEHICLE_SEARCH_TOOL_NAME,
                "'search_query' must be a string",
            )
        })?;

        let vector = api::get_embedding(&self.http_client, &self.config, search_query).await?;
        debug!(query = search_query, dimensions = vector.len(), "Embedded search query.");

        let documents = self
            .search_client
            .hybrid_search(
                search_query,
                &vector,
                VECTOR_FIELD,
                K_NEAREST_NEIGHBORS,
                TOP_RESULTS,
            )
            .await?;

        info!(
            query = search_query,
            count = documents.len(),
            "Vehicle search returned {} result(s).",
            documents.len()
        );

        // Zero matches is an empty result, not an error.
        let mut summaries = String::new();
        for document in documents.iter().take(TOP_RESULTS as usize) {
            summaries.push_str(&document.summary);
            summaries.push('\n');
        }
        Ok(summaries)
    }
}
