//! Danabot - deterministic travel and weather assistant for Đà Nẵng and Hội An
//!
//! Routing, gating, and tool selection are ordinary code paths driven by
//! keyword tables, so every query takes a reproducible route through the
//! system. Retrieval adapters (weather, web search, place index) return
//! refusal values instead of errors; providers are the only async I/O.

pub mod agents;
mod config;
pub mod policy;
pub mod tools;
pub mod utils;

pub mod cli;

pub use config::{
    LoggingConfig, PlacesConfig, RegionConfig, SearchConfig, Settings, WeatherConfig,
};

use agents::{Supervisor, TravelInformationAgent, WeatherAgent};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tools::places::{HttpPlaceIndex, PlaceSearchTool};
use tools::search::{EventSearchTool, SearchClient, TourismSearchTool};
use tools::weather::{CurrentWeatherTool, ForecastTool, WeatherClient};

static ASSISTANT: OnceCell<Assistant> = OnceCell::new();

/// Composition root wiring adapters into handlers and the supervisor.
pub struct Assistant {
    supervisor: Supervisor,
}

impl Assistant {
    /// Build every retrieval client, then wire the handler tree.
    ///
    /// Client construction runs behind one barrier so a missing secret
    /// fails startup instead of the first request.
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let (weather_client, search_client, place_index) = tokio::try_join!(
            build_weather_client(settings),
            build_search_client(settings),
            build_place_index(settings),
        )?;

        let weather = WeatherAgent::new(
            Arc::new(CurrentWeatherTool::new(Arc::clone(&weather_client))),
            Arc::new(ForecastTool::new(weather_client)),
        );

        let travel = TravelInformationAgent::new(
            Arc::new(TourismSearchTool::new(
                Arc::clone(&search_client),
                settings.region.default_region.clone(),
                settings.search.max_results,
            )),
            Arc::new(EventSearchTool::new(
                search_client,
                settings.search.deep_max_results,
                None,
            )),
            Arc::new(PlaceSearchTool::new(
                place_index,
                settings.places.result_limit,
            )),
        );

        Ok(Self {
            supervisor: Supervisor::new(Arc::new(weather), Arc::new(travel)),
        })
    }

    /// Answer one utterance. Always returns displayable text.
    pub async fn ask(&self, utterance: &str) -> String {
        self.supervisor.handle(utterance).await
    }
}

async fn build_weather_client(settings: &Settings) -> anyhow::Result<Arc<WeatherClient>> {
    let api_key = Settings::weather_api_key()?;
    Ok(Arc::new(WeatherClient::new(&settings.weather, api_key)))
}

async fn build_search_client(settings: &Settings) -> anyhow::Result<Arc<SearchClient>> {
    let api_key = Settings::search_api_key()?;
    Ok(Arc::new(SearchClient::new(&settings.search, api_key)))
}

async fn build_place_index(settings: &Settings) -> anyhow::Result<Arc<HttpPlaceIndex>> {
    Ok(Arc::new(HttpPlaceIndex::new(&settings.places)))
}

/// Initialize the global assistant. Must be called before [`ask`].
pub async fn init() -> anyhow::Result<()> {
    let settings = Settings::new()?;
    init_with(settings).await
}

/// Initialize the global assistant from already-loaded settings.
pub async fn init_with(settings: Settings) -> anyhow::Result<()> {
    let assistant = Assistant::new(&settings).await?;
    ASSISTANT
        .set(assistant)
        .map_err(|_| anyhow::anyhow!("Assistant already initialized"))?;

    tracing::info!("Danabot assistant initialized");
    Ok(())
}

/// Answer one utterance with the global assistant.
pub async fn ask(utterance: &str) -> anyhow::Result<String> {
    let assistant = ASSISTANT
        .get()
        .ok_or_else(|| anyhow::anyhow!("Assistant not initialized. Call init() first"))?;
    Ok(assistant.ask(utterance).await)
}
