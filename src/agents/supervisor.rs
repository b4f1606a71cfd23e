//! Deterministic query router and response post-filter
//!
//! The supervisor replaces free-form delegation with a fixed precedence:
//! weather keywords first, then tourism and event keywords, then a bare
//! served-city mention (treated as a weather question). Handler output
//! passes through a post-filter that strips transfer chatter and input
//! echoes before anything reaches the user.

use crate::agents::handler::Handler;
use crate::agents::messages::ConversationMessage;
use crate::policy::{location, topic};
use std::sync::Arc;

/// Shown when no routing rule matches the utterance.
pub const UNROUTED_FALLBACK: &str =
    "🤖 Xin lỗi, tôi chỉ hỗ trợ các câu hỏi về thời tiết và du lịch tại khu vực \
     Đà Nẵng - Hội An. Bạn có thể hỏi về thời tiết, khách sạn, ẩm thực, điểm \
     tham quan hoặc sự kiện trong khu vực.";

/// Shown when the post-filter removes every handler message.
pub const NO_CONTENT_FALLBACK: &str = "❌ Không có phản hồi nội dung từ agent.";

/// Substrings marking inter-agent transfer chatter, matched
/// case-insensitively.
const TRANSFER_MARKERS: &[&str] = &["transferred to", "transferring", "successfully transfer"];

/// Where an utterance is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterDecision {
    Weather,
    TravelInformation,
    Unrouted,
}

/// Fixed-precedence routing rule.
///
/// A bare served-city mention with no other signal counts as a weather
/// question, matching how users ask "Đà Nẵng thế nào hôm nay?".
pub fn route(utterance: &str) -> RouterDecision {
    if topic::is_weather_query(utterance) {
        return RouterDecision::Weather;
    }
    if topic::is_tourism_query(utterance) || topic::is_event_query(utterance) {
        return RouterDecision::TravelInformation;
    }
    if location::find_in(utterance).is_some() {
        return RouterDecision::Weather;
    }
    RouterDecision::Unrouted
}

pub struct Supervisor {
    weather: Arc<dyn Handler>,
    travel: Arc<dyn Handler>,
}

impl Supervisor {
    pub fn new(weather: Arc<dyn Handler>, travel: Arc<dyn Handler>) -> Self {
        Self { weather, travel }
    }

    /// Route, delegate, and reduce the message stream to one reply.
    pub async fn handle(&self, utterance: &str) -> String {
        let decision = route(utterance);
        tracing::info!("[supervisor] routed to {:?}", decision);

        let handler = match decision {
            RouterDecision::Weather => &self.weather,
            RouterDecision::TravelInformation => &self.travel,
            RouterDecision::Unrouted => return UNROUTED_FALLBACK.to_string(),
        };

        let mut stream = vec![
            ConversationMessage::user(utterance),
            ConversationMessage::new(
                "supervisor",
                format!("Successfully transferred to {}", handler.id()),
            ),
        ];
        stream.extend(handler.handle(utterance).await);
        stream.push(ConversationMessage::new(
            handler.id().name(),
            "Transferring back to supervisor",
        ));

        post_filter(&stream, utterance)
    }
}

/// Drop transfer chatter and input echoes, then join what survives.
///
/// Survivor order is preserved; an empty survivor set yields the
/// no-content sentinel so the caller always gets displayable text.
pub fn post_filter(stream: &[ConversationMessage], utterance: &str) -> String {
    let survivors: Vec<&str> = stream
        .iter()
        .filter(|message| {
            let lowered = message.content.to_lowercase();
            if TRANSFER_MARKERS.iter().any(|marker| lowered.contains(marker)) {
                return false;
            }
            message.content.trim() != utterance.trim()
        })
        .map(|message| message.content.as_str())
        .collect();

    if survivors.is_empty() {
        NO_CONTENT_FALLBACK.to_string()
    } else {
        survivors.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::handler::HandlerId;
    use async_trait::async_trait;

    struct FixedHandler {
        id: HandlerId,
        reply: Vec<&'static str>,
    }

    #[async_trait]
    impl Handler for FixedHandler {
        fn id(&self) -> HandlerId {
            self.id
        }

        async fn handle(&self, _utterance: &str) -> Vec<ConversationMessage> {
            self.reply
                .iter()
                .map(|text| ConversationMessage::new(self.id.name(), *text))
                .collect()
        }
    }

    fn supervisor(weather_reply: Vec<&'static str>, travel_reply: Vec<&'static str>) -> Supervisor {
        Supervisor::new(
            Arc::new(FixedHandler {
                id: HandlerId::Weather,
                reply: weather_reply,
            }),
            Arc::new(FixedHandler {
                id: HandlerId::TravelInformation,
                reply: travel_reply,
            }),
        )
    }

    #[test]
    fn weather_keywords_win_over_city_and_tourism() {
        assert_eq!(route("thời tiết Đà Nẵng hôm nay"), RouterDecision::Weather);
        // Both weather and tourism signals: weather has precedence.
        assert_eq!(
            route("trời mưa thì nên đi bảo tàng nào"),
            RouterDecision::Weather
        );
    }

    #[test]
    fn tourism_and_event_route_to_travel() {
        assert_eq!(
            route("khách sạn gần biển Mỹ Khê"),
            RouterDecision::TravelInformation
        );
        assert_eq!(
            route("sự kiện cuối tuần này"),
            RouterDecision::TravelInformation
        );
        // Out-of-region tourism still routes; the handler refuses it.
        assert_eq!(
            route("khách sạn ở Hà Nội"),
            RouterDecision::TravelInformation
        );
    }

    #[test]
    fn bare_city_mention_is_a_weather_question() {
        assert_eq!(route("Đà Nẵng hôm nay thế nào"), RouterDecision::Weather);
        assert_eq!(route("hoi an thì sao"), RouterDecision::Weather);
    }

    #[test]
    fn unmatched_utterances_are_unrouted() {
        assert_eq!(route("2 + 2 bằng mấy"), RouterDecision::Unrouted);
        assert_eq!(route(""), RouterDecision::Unrouted);
    }

    #[test]
    fn post_filter_strips_transfer_chatter_and_echo() {
        let utterance = "thời tiết Đà Nẵng";
        let stream = vec![
            ConversationMessage::user(utterance),
            ConversationMessage::new("supervisor", "Successfully transferred to weather_agent"),
            ConversationMessage::new("weather_agent", "🌤️ Thời tiết tại Đà Nẵng: 28°C"),
            ConversationMessage::new("weather_agent", "Transferring back to supervisor"),
        ];

        assert_eq!(post_filter(&stream, utterance), "🌤️ Thời tiết tại Đà Nẵng: 28°C");
    }

    #[test]
    fn post_filter_marker_match_is_case_insensitive() {
        let stream = vec![ConversationMessage::new(
            "weather_agent",
            "SUCCESSFULLY TRANSFERRED to someone",
        )];
        assert_eq!(post_filter(&stream, "x"), NO_CONTENT_FALLBACK);
    }

    #[test]
    fn post_filter_joins_survivors_in_order() {
        let stream = vec![
            ConversationMessage::new("travel_information_agent", "phần một"),
            ConversationMessage::new("travel_information_agent", "phần hai"),
        ];
        assert_eq!(post_filter(&stream, "câu hỏi"), "phần một\n\nphần hai");
    }

    #[tokio::test]
    async fn handle_returns_filtered_handler_output() {
        let supervisor = supervisor(vec!["🌤️ 28°C tại Đà Nẵng"], vec![]);
        let reply = supervisor.handle("thời tiết Đà Nẵng").await;
        assert_eq!(reply, "🌤️ 28°C tại Đà Nẵng");
    }

    #[tokio::test]
    async fn handle_with_silent_handler_yields_sentinel() {
        let supervisor = supervisor(vec![], vec![]);
        let reply = supervisor.handle("thời tiết Đà Nẵng").await;
        assert_eq!(reply, NO_CONTENT_FALLBACK);
    }

    #[tokio::test]
    async fn unrouted_utterance_gets_fixed_fallback() {
        let supervisor = supervisor(vec!["should not appear"], vec!["should not appear"]);
        let reply = supervisor.handle("2 + 2 bằng mấy").await;
        assert_eq!(reply, UNROUTED_FALLBACK);
    }
}
