//! Travel-information handler policy
//!
//! This handler only selects adapters; scope and topic gating for web
//! queries lives in the web-search adapter itself so refusal text is
//! produced in one place. Selection is deterministic: event keywords
//! pick the deep event search, venue categories pick the place index,
//! everything else falls through to the gated web search.

use crate::agents::handler::{invoke_tools, Handler, HandlerId};
use crate::agents::messages::ConversationMessage;
use crate::policy::topic::{self, TourismCategory};
use crate::tools::{registry::ToolRegistry, Tool, ToolCall};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Categories answered from the local place index rather than the web.
const PLACE_CATEGORIES: &[TourismCategory] = &[
    TourismCategory::Accommodation,
    TourismCategory::Food,
    TourismCategory::Attractions,
];

pub struct TravelInformationAgent {
    tools: ToolRegistry,
}

impl TravelInformationAgent {
    pub fn new(
        web_search: Arc<dyn Tool>,
        event_search: Arc<dyn Tool>,
        place_search: Arc<dyn Tool>,
    ) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(web_search);
        tools.register(event_search);
        tools.register(place_search);
        Self { tools }
    }

    fn select_tools(utterance: &str) -> Vec<ToolCall> {
        let query = json!({ "query": utterance });

        // Out-of-region and off-topic queries go to web_search, whose
        // gates produce the refusal without touching the network.
        if topic::mentions_out_of_region(utterance) {
            return vec![ToolCall::new("web_search", query)];
        }

        let mut calls = Vec::new();
        if topic::is_event_query(utterance) {
            calls.push(ToolCall::new("event_search", query.clone()));
        }
        if topic::tourism_category(utterance)
            .is_some_and(|category| PLACE_CATEGORIES.contains(&category))
        {
            calls.push(ToolCall::new("place_search", query.clone()));
        }
        if calls.is_empty() {
            calls.push(ToolCall::new("web_search", query));
        }
        calls
    }
}

#[async_trait]
impl Handler for TravelInformationAgent {
    fn id(&self) -> HandlerId {
        HandlerId::TravelInformation
    }

    async fn handle(&self, utterance: &str) -> Vec<ConversationMessage> {
        let calls = Self::select_tools(utterance);
        tracing::info!(
            "[travel_information_agent] selected tools: {:?}",
            calls.iter().map(|c| c.tool.as_str()).collect::<Vec<_>>()
        );
        invoke_tools(&self.tools, calls, self.id()).await
    }
}
