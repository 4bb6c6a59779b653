// holonet-core/src/tools/starships.rs

//! Tool A: starship lookup against the swapi.dev REST API.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::Tool;
use crate::errors::ToolCallError;
use crate::models::tools::{ToolDefinition, ToolInput};

pub const STARSHIP_LOOKUP_TOOL_NAME: &str = "call_starwars_api";
pub const NO_STARSHIP_FOUND: &str = "No starship found.";

/// One page of the swapi `starships` listing.
#[derive(Deserialize, Debug, Clone)]
pub struct StarshipPage {
    pub count: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Starship>,
}

/// A swapi starship record. All scalar fields arrive as strings.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Starship {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub cost_in_credits: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub max_atmosphering_speed: String,
    #[serde(default)]
    pub crew: String,
    #[serde(default)]
    pub passengers: String,
    #[serde(default)]
    pub cargo_capacity: String,
    #[serde(default)]
    pub consumables: String,
    #[serde(default)]
    pub hyperdrive_rating: String,
    #[serde(rename = "MGLT", default)]
    pub mglt: String,
    #[serde(default)]
    pub starship_class: String,
    #[serde(default)]
    pub pilots: Vec<String>,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub edited: String,
    #[serde(default)]
    pub url: String,
}

impl Starship {
    /// Flattens the record into the fixed-order summary fed to the model.
    pub fn to_model_readable(&self) -> String {
        format!(
            "Name: {}, Model: {}, Manufacturer: {}, Cost in credits: {}, Length: {}, \
             Max atmosphering speed: {}, Crew: {}, Passengers: {}, Cargo capacity: {}, \
             Consumables: {}, Hyperdrive rating: {}, MGLT: {}, Starship class: {}, \
             Pilots: {}, Films: {}",
            self.name,
            self.model,
            self.manufacturer,
            self.cost_in_credits,
            self.length,
            self.max_atmosphering_speed,
            self.crew,
            self.passengers,
            self.cargo_capacity,
            self.consumables,
            self.hyperdrive_rating,
            self.mglt,
            self.starship_class,
            self.pilots.join(", "),
            self.films.join(", "),
        )
    }
}

/// Looks a starship up by name via `GET {base_url}starships?search=<name>`.
pub struct StarshipLookup {
    http_client: Client,
    base_url: Url,
}

impl StarshipLookup {
    pub fn new(http_client: Client, base_url: Url) -> Self {
        Self { http_client, base_url }
    }

    async fn search(&self, ship_name: &str) -> Result<StarshipPage> {
        let mut url = self
            .base_url
            .join("starships")
            .context("Failed to build starship search URL")?;
        url.query_pairs_mut().append_pair("search", ship_name);

        debug!(%url, "Querying starship API.");
        let response = self
            .http_client
            .get(url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .context("Failed to send starship lookup request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .context("Failed to read starship lookup error body")?;
            return Err(anyhow!("Starship API error: {} - {}", status, error_text));
        }

        response
            .json::<StarshipPage>()
            .await
            .context("Failed to deserialize starship lookup response")
    }
}

#[async_trait]
impl Tool for StarshipLookup {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::single_string_param(
            STARSHIP_LOOKUP_TOOL_NAME,
            "Gets Star Wars starship information.",
            "ship_name",
            "The name of the ship, e.g. CR90 corvette",
        )
    }

    async fn invoke(&self, input: ToolInput) -> Result<String> {
        let ship_name = input.required_str("ship_name").ok_or_else(|| {
            ToolCallError::invalid_arguments(
                STARSHIP_LOOKUP_TOOL_NAME,
                "'ship_name' must be a string",
            )
        })?;

        let page = self.search(ship_name).await?;
        if page.count == 0 {
            info!(ship_name, "No starship found.");
            return Ok(NO_STARSHIP_FOUND.to_string());
        }

        // Only the first match is summarized, even when the page has more.
        let first = page
            .results
            .first()
            .ok_or_else(|| anyhow!("Starship API reported count={} but returned no results", page.count))?;
        Ok(first.to_model_readable())
    }
}
