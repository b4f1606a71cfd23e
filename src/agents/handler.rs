//! Handler policy contract
//!
//! A handler owns one domain. Per request it runs its gate checks,
//! selects zero or more tools, invokes them, and synthesizes a reply by
//! concatenating tool output verbatim. A refusal is a normal terminal
//! value: a handler always produces messages, never an error.

use crate::agents::messages::ConversationMessage;
use crate::tools::{registry::ToolRegistry, ToolCall};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a handler policy, used by routing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerId {
    Weather,
    TravelInformation,
}

impl HandlerId {
    pub fn name(&self) -> &'static str {
        match self {
            HandlerId::Weather => "weather_agent",
            HandlerId::TravelInformation => "travel_information_agent",
        }
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-domain decision procedure.
#[async_trait]
pub trait Handler: Send + Sync {
    fn id(&self) -> HandlerId;

    /// Run the full Start -> GateChecks -> ToolSelection ->
    /// ToolInvocation -> Synthesize pipeline for one utterance.
    async fn handle(&self, utterance: &str) -> Vec<ConversationMessage>;
}

/// Invoke the selected tools in order and return one content message per
/// outcome. Refusals come back as messages like any other result.
pub async fn invoke_tools(
    registry: &ToolRegistry,
    calls: Vec<ToolCall>,
    handler: HandlerId,
) -> Vec<ConversationMessage> {
    let mut messages = Vec::with_capacity(calls.len());
    for call in calls {
        let Some(tool) = registry.get(&call.tool) else {
            tracing::error!("[{}] tool '{}' is not registered", handler, call.tool);
            continue;
        };
        tracing::info!("[{}] invoking tool: {}", handler, call.tool);
        let outcome = tool.call(call.args).await;
        messages.push(ConversationMessage::new(
            handler.name(),
            outcome.text().to_string(),
        ));
    }
    messages
}
