// holonet-core/src/search.rs

//! REST client for the hybrid (full-text + semantic + vector) search index.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::SearchConfig;

const API_VERSION: &str = "2024-07-01";
const SEMANTIC_CONFIGURATION: &str = "default";
/// Cap on how long the service may spend on semantic answer/caption
/// generation before returning partial results.
const SEMANTIC_MAX_WAIT_MS: u32 = 5_000;

/// A document from the vehicle index. Fields the index does not populate
/// decode as empty strings.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct VehicleDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub manufacturer: String,
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    value: Vec<VehicleDocument>,
}

// The request body is serialized from typed structs rather than a
// `serde_json::Value`: going through `Value` widens each f32 vector
// component to f64 and changes its decimal rendering on the wire.
#[derive(Serialize)]
struct VectorQuery<'a> {
    kind: &'static str,
    vector: &'a [f32],
    k: u32,
    fields: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    search: &'a str,
    top: u32,
    query_type: &'static str,
    semantic_configuration: &'static str,
    answers: &'static str,
    captions: &'static str,
    semantic_error_handling: &'static str,
    semantic_max_wait_in_milliseconds: u32,
    vector_queries: [VectorQuery<'a>; 1],
}

/// Client for one named index of the search collaborator.
pub struct SearchClient {
    http_client: Client,
    endpoint: Url,
    api_key: String,
    index: String,
}

impl SearchClient {
    pub fn new(http_client: Client, config: &SearchConfig) -> Self {
        Self {
            http_client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            index: config.index.clone(),
        }
    }

    fn search_url(&self) -> Result<Url> {
        let mut url = self
            .endpoint
            .join(&format!("indexes/{}/docs/search", self.index))
            .context("Failed to build search URL")?;
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    /// Hybrid search: full-text query plus semantic ranking plus vector
    /// k-nearest-neighbor (k) over `vector_field`, returning at most `top`
    /// documents.
    pub async fn hybrid_search(
        &self,
        query: &str,
        vector: &[f32],
        vector_field: &str,
        k: u32,
        top: u32,
    ) -> Result<Vec<VehicleDocument>> {
        let url = self.search_url()?;

        let request_body = SearchRequest {
            search: query,
            top,
            query_type: "semantic",
            semantic_configuration: SEMANTIC_CONFIGURATION,
            answers: "extractive",
            captions: "extractive",
            semantic_error_handling: "partial",
            semantic_max_wait_in_milliseconds: SEMANTIC_MAX_WAIT_MS,
            vector_queries: [VectorQuery {
                kind: "vector",
                vector,
                k,
                fields: vector_field,
            }],
        };

        let response = self
            .http_client
            .post(url)
            .header("Content-Type", "application/json")
            .header("api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .context("Failed to send search request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .context("Failed to read search error response body")?;
            return Err(anyhow!("Search API error: {} - {}", status, error_text));
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to deserialize search response")?;

        debug!(count = body.value.len(), "Search returned {} document(s).", body.value.len());
        Ok(body.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_client(base_url: &str) -> SearchClient {
        SearchClient::new(
            Client::new(),
            &SearchConfig {
                endpoint: Url::parse(&format!("{}/", base_url)).unwrap(),
                api_key: "search-key".to_string(),
                index: "swapi-vehicle-index".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_hybrid_search_decodes_documents() {
        let server = MockServer::start_async().await;
        let client = test_client(&server.base_url());

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/indexes/swapi-vehicle-index/docs/search")
                    .query_param("api-version", API_VERSION)
                    .header("api-key", "search-key")
                    .json_body_partial(
                        json!({
                            "search": "sand crawler",
                            "top": 3,
                            "queryType": "semantic",
                            "vectorQueries": [{
                                "kind": "vector",
                                "vector": [0.1, 0.2],
                                "k": 3,
                                "fields": "summary_vector",
                            }],
                        })
                        .to_string(),
                    );
                then.status(200).json_body(json!({
                    "value": [
                        {"title": "Sand Crawler", "summary": "A huge treaded fortress.", "model": "Digger Crawler", "manufacturer": "Corellia Mining Corporation"},
                        {"title": "Sail barge", "summary": "A luxury sail barge."}
                    ]
                }));
            })
            .await;

        let docs = client
            .hybrid_search("sand crawler", &[0.1, 0.2], "summary_vector", 3, 3)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].summary, "A huge treaded fortress.");
        assert_eq!(docs[1].model, "");
    }

    #[tokio::test]
    async fn test_hybrid_search_zero_matches_is_ok() {
        let server = MockServer::start_async().await;
        let client = test_client(&server.base_url());

        server
            .mock_async(|when, then| {
                when.method(POST).path("/indexes/swapi-vehicle-index/docs/search");
                then.status(200).json_body(json!({ "value": [] }));
            })
            .await;

        let docs = client
            .hybrid_search("nothing", &[0.0], "summary_vector", 3, 3)
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_hybrid_search_surfaces_http_error() {
        let server = MockServer::start_async().await;
        let client = test_client(&server.base_url());

        server
            .mock_async(|when, then| {
                when.method(POST).path("/indexes/swapi-vehicle-index/docs/search");
                then.status(403).body("forbidden");
            })
            .await;

        let result = client
            .hybrid_search("anything", &[0.0], "summary_vector", 3, 3)
            .await;
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("403"));
    }
}
