//! Weather handler policy
//!
//! Gate order is fixed: out-of-region block, then domain check, then
//! location requirement (this handler refuses rather than assuming a
//! default city). Tool selection is forecast-vs-current by intent
//! keywords; output is returned verbatim.

use crate::agents::handler::{invoke_tools, Handler, HandlerId};
use crate::agents::messages::ConversationMessage;
use crate::policy::{location, topic};
use crate::tools::{registry::ToolRegistry, Tool, ToolCall};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

/// Fixed refusal for any location outside the served pair.
pub const OUT_OF_SCOPE_REFUSAL: &str =
    "Xin lỗi, tôi chỉ cung cấp thông tin thời tiết cho Đà Nẵng và Hội An.";

/// Fixed refusal for non-weather questions that end up here.
pub const OFF_TOPIC_REFUSAL: &str =
    "Xin lỗi, tôi chỉ trả lời các câu hỏi về thời tiết tại Đà Nẵng và Hội An.";

pub struct WeatherAgent {
    tools: ToolRegistry,
}

impl WeatherAgent {
    pub fn new(current: Arc<dyn Tool>, forecast: Arc<dyn Tool>) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(current);
        tools.register(forecast);
        Self { tools }
    }

    /// Deterministic mapping from intent keywords to a single tool call.
    fn select_tools(utterance: &str, location: location::Location) -> Vec<ToolCall> {
        if topic::wants_forecast(utterance) {
            let days = topic::requested_day_count(utterance).unwrap_or(3);
            vec![ToolCall::new(
                "get_weather_forecast",
                json!({"location": location.display_name(), "days": days}),
            )]
        } else {
            vec![ToolCall::new(
                "get_weather",
                json!({"location": location.display_name()}),
            )]
        }
    }

    fn refusal(&self, text: &str) -> Vec<ConversationMessage> {
        vec![ConversationMessage::new(self.id().name(), text)]
    }
}

#[async_trait]
impl Handler for WeatherAgent {
    fn id(&self) -> HandlerId {
        HandlerId::Weather
    }

    async fn handle(&self, utterance: &str) -> Vec<ConversationMessage> {
        // Gate 1: blocklisted places refuse regardless of topic.
        if topic::mentions_out_of_region(utterance) {
            tracing::info!("[weather_agent] out-of-region utterance refused");
            return self.refusal(OUT_OF_SCOPE_REFUSAL);
        }

        // Gate 2: domain check. A bare served-city mention still counts
        // as a weather question for this handler.
        let mentioned = location::find_in(utterance);
        if !topic::is_weather_query(utterance) && mentioned.is_none() {
            tracing::info!("[weather_agent] off-topic utterance refused");
            return self.refusal(OFF_TOPIC_REFUSAL);
        }

        // Gate 3: a location is required; no default is assumed.
        let Some(location) = mentioned else {
            tracing::info!("[weather_agent] no served location named, refused");
            return self.refusal(OUT_OF_SCOPE_REFUSAL);
        };

        let calls = Self::select_tools(utterance, location);
        invoke_tools(&self.tools, calls, self.id()).await
    }
}
