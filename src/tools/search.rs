//! Web-search adapters backed by the Tavily HTTP API
//!
//! Two adapters share one client: a tourism-gated general search and an
//! advanced-depth event search. The tourism adapter refuses out-of-scope
//! queries before any network call and rewrites in-scope queries to pin
//! them to the served region.

use super::{ProviderError, Tool, ToolMetadata, ToolOutcome, ToolParameter};
use crate::config::SearchConfig;
use crate::policy::topic;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

const OFF_TOPIC_REFUSAL_HEADER: &str =
    "❌ Xin lỗi, tool này chỉ hỗ trợ tìm kiếm thông tin du lịch trong khu vực Đà Nẵng - Quảng Nam.\n\n\
🎯 Bạn có thể hỏi về:\n\
• 🏨 Khách sạn, resort, homestay\n\
• 🏖️ Điểm du lịch, danh lam thắng cảnh\n\
• 🍜 Ẩm thực, món ăn đặc sản\n\
• 🎭 Hoạt động vui chơi, văn hóa\n\
• 🛍️ Mua sắm, chợ đêm\n\
• 🚗 Phương tiện di chuyển\n\n\
💡 Ví dụ: \"khách sạn gần biển Mỹ Khê\", \"món ăn ngon ở Hội An\", \"tour Bà Nà Hills\"";

const OUT_OF_REGION_REFUSAL_HEADER: &str =
    "❌ Xin lỗi, tôi chỉ cung cấp thông tin du lịch ở khu vực Đà Nẵng - Quảng Nam.";

const OUT_OF_REGION_REFUSAL_FOOTER: &str = "💡 Thay vào đó, bạn có thể hỏi:\n\
• \"khách sạn 5 sao ở Đà Nẵng\"\n\
• \"món ăn đặc sản Hội An\"\n\
• \"tour Bà Nà Hills\"\n\
• \"điểm tham quan Sơn Trà\"\n\
• \"lễ hội đèn lồng Hội An\"\n\n\
🌟 Khu vực Đà Nẵng - Quảng Nam có rất nhiều điều thú vị để khám phá!";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    include_answer: bool,
    include_images: bool,
    include_raw_content: bool,
    max_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    error: Option<String>,
}

/// Single-attempt HTTP client for the search provider.
pub struct SearchClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl SearchClient {
    pub fn new(config: &SearchConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs: config.timeout_secs,
        }
    }

    pub async fn search(
        &self,
        query: &str,
        depth: &str,
        max_results: usize,
        domain: Option<&str>,
    ) -> Result<SearchResponse, ProviderError> {
        let request = SearchRequest {
            api_key: &self.api_key,
            query,
            search_depth: depth,
            include_answer: true,
            include_images: false,
            include_raw_content: false,
            max_results,
            domain,
        };

        tracing::debug!("Search request ({}): {}", depth, query);

        let call = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send();

        let response = match timeout(Duration::from_secs(self.timeout_secs), call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ProviderError::from_transport(e)),
            Err(_) => return Err(ProviderError::Timeout),
        };

        if response.status().as_u16() == 401 {
            return Err(ProviderError::Auth);
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Other(format!("malformed payload: {}", e)))?;

        if let Some(error) = payload.error {
            return Err(ProviderError::Other(error));
        }
        Ok(payload)
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let short: String = text.chars().take(limit).collect();
        format!("{}...", short)
    } else {
        text.to_string()
    }
}

fn format_hits(response: &SearchResponse, max_results: usize, content_limit: usize) -> String {
    let mut body = String::new();
    if let Some(answer) = &response.answer {
        body += &format!("💡 {}\n\n", answer);
    }
    for (i, hit) in response.results.iter().take(max_results).enumerate() {
        let title = hit.title.as_deref().unwrap_or("Không có tiêu đề");
        body += &format!("**{}. {}**\n", i + 1, title);
        if let Some(content) = &hit.content {
            body += &format!("   {}\n", truncate_chars(content, content_limit));
        }
        if let Some(url) = &hit.url {
            body += &format!("   🔗 {}\n", url);
        }
    }
    body.trim_end().to_string()
}

/// Append the default region token when no served-region alias is present
/// and prepend a tourism marker when no tourism keyword is present.
/// Returns the rewritten query and whether the region was auto-injected.
pub fn enhance_query(query: &str, default_region: &str) -> (String, bool) {
    let has_region = topic::mentions_served_region(query);
    let mut enhanced = if has_region {
        query.to_string()
    } else {
        format!("{} {}", query, default_region)
    };
    if !topic::is_tourism_query(query) {
        enhanced = format!("du lịch {}", enhanced);
    }
    (enhanced, !has_region)
}

/// Tourism web-search adapter: gate, rewrite, search, wrap.
pub struct TourismSearchTool {
    client: Arc<SearchClient>,
    default_region: String,
    max_results: usize,
}

impl TourismSearchTool {
    pub fn new(client: Arc<SearchClient>, default_region: String, max_results: usize) -> Self {
        Self {
            client,
            default_region,
            max_results,
        }
    }
}

#[async_trait]
impl Tool for TourismSearchTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: "web_search".to_string(),
            description:
                "Tìm kiếm thông tin du lịch trên web cho khu vực Đà Nẵng - Quảng Nam.".to_string(),
            parameters: vec![ToolParameter {
                name: "query".to_string(),
                param_type: "string".to_string(),
                description: "Truy vấn tìm kiếm về du lịch Đà Nẵng - Quảng Nam.".to_string(),
                required: true,
            }],
        }
    }

    async fn call(&self, args: Value) -> ToolOutcome {
        let query = args["query"].as_str().unwrap_or("").trim();
        if query.is_empty() {
            return ToolOutcome::validation_refusal("❌ Thiếu truy vấn tìm kiếm.");
        }

        // Gate order is fixed: region block first, then topic.
        if topic::mentions_out_of_region(query) {
            return ToolOutcome::scope_refusal(format!(
                "{}\n\n🎯 Bạn đã hỏi về \"{}\" - có vẻ thuộc địa điểm khác.\n\n{}",
                OUT_OF_REGION_REFUSAL_HEADER, query, OUT_OF_REGION_REFUSAL_FOOTER
            ));
        }
        if !topic::is_tourism_query(query) {
            return ToolOutcome::scope_refusal(format!(
                "{}\n\nQuery của bạn: \"{}\" không thuộc phạm vi hỗ trợ.",
                OFF_TOPIC_REFUSAL_HEADER, query
            ));
        }

        let (enhanced, auto_injected) = enhance_query(query, &self.default_region);
        tracing::debug!(
            "Tourism search: '{}' -> '{}' (auto region: {})",
            query,
            enhanced,
            auto_injected
        );

        let response = match self
            .client
            .search(&enhanced, "basic", self.max_results, None)
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!("web_search refused: [{}] {}", error.tag(), error);
                return ToolOutcome::provider_refusal(
                    &error,
                    format!("❌ Đã xảy ra lỗi khi tìm kiếm thông tin du lịch: {}", error),
                );
            }
        };

        if response.results.is_empty() && response.answer.is_none() {
            let error = ProviderError::Empty;
            return ToolOutcome::provider_refusal(
                &error,
                format!(
                    "⚠️ Không tìm thấy thông tin du lịch nào cho '{}' trong khu vực Đà Nẵng - Quảng Nam.",
                    query
                ),
            );
        }

        let body = format_hits(&response, self.max_results, 300);
        let wrapped = if auto_injected {
            format!(
                "🎯 Tôi chỉ cung cấp thông tin du lịch ở Đà Nẵng - Quảng Nam.\n\n\
                 Kết quả tìm kiếm cho \"{}\" tại {}:\n---\n{}\n---\n\
                 💡 Lần sau bạn có thể hỏi trực tiếp: \"{} ở {}\" để rõ ràng hơn.",
                query, self.default_region, body, query, self.default_region
            )
        } else {
            format!(
                "🎯 Kết quả tìm kiếm du lịch cho \"{}\":\n---\n{}\n---\n\
                 💡 Để có kết quả tốt nhất, hãy hỏi về: địa điểm du lịch, ẩm thực, khách sạn, \
                 hoạt động vui chơi, văn hóa trong khu vực Đà Nẵng - Quảng Nam.",
                query, body
            )
        };

        ToolOutcome::content(wrapped)
    }
}

/// Advanced-depth event search adapter.
pub struct EventSearchTool {
    client: Arc<SearchClient>,
    max_results: usize,
    domain: Option<String>,
}

impl EventSearchTool {
    pub fn new(client: Arc<SearchClient>, max_results: usize, domain: Option<String>) -> Self {
        Self {
            client,
            max_results,
            domain,
        }
    }
}

#[async_trait]
impl Tool for EventSearchTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: "event_search".to_string(),
            description:
                "Tìm kiếm sâu về các sự kiện, lễ hội tại Đà Nẵng và Hội An.".to_string(),
            parameters: vec![ToolParameter {
                name: "query".to_string(),
                param_type: "string".to_string(),
                description: "Truy vấn về sự kiện, lễ hội trong khu vực.".to_string(),
                required: true,
            }],
        }
    }

    async fn call(&self, args: Value) -> ToolOutcome {
        let query = args["query"].as_str().unwrap_or("").trim();
        if query.is_empty() {
            return ToolOutcome::validation_refusal("❌ Thiếu truy vấn tìm kiếm.");
        }

        let response = match self
            .client
            .search(query, "advanced", self.max_results, self.domain.as_deref())
            .await
        {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!("event_search refused: [{}] {}", error.tag(), error);
                return ToolOutcome::provider_refusal(
                    &error,
                    format!("❌ Lỗi khi tìm kiếm sâu: {}", error),
                );
            }
        };

        if response.results.is_empty() {
            let error = ProviderError::Empty;
            return ToolOutcome::provider_refusal(
                &error,
                format!("❌ Không tìm thấy kết quả nào cho: {}", query),
            );
        }

        let mut report = format!("🔍 **Tìm kiếm sâu cho:** {}\n\n", query);
        if let Some(answer) = &response.answer {
            report += &format!("💡 **Phân tích chi tiết:** {}\n\n", answer);
        }
        report += "📚 **Thông tin chi tiết:**\n";
        for (i, hit) in response.results.iter().take(self.max_results).enumerate() {
            let title = hit.title.as_deref().unwrap_or("Không có tiêu đề");
            report += &format!("\n**{}. {}**\n", i + 1, title);
            if let Some(content) = &hit.content {
                report += &format!("   {}\n", truncate_chars(content, 400));
            }
            if let Some(url) = &hit.url {
                report += &format!("   🔗 {}\n", url);
            }
        }

        ToolOutcome::content(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::RefusalKind;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> SearchConfig {
        SearchConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            max_results: 3,
            deep_max_results: 5,
        }
    }

    fn client_for(server: &MockServer) -> Arc<SearchClient> {
        Arc::new(SearchClient::new(
            &test_config(&server.uri()),
            "test-key".to_string(),
        ))
    }

    fn hits_body() -> serde_json::Value {
        json!({
            "answer": "Tổng hợp nhanh.",
            "results": [
                {"title": "Bài 1", "url": "https://a.example", "content": "Nội dung 1"},
                {"title": "Bài 2", "url": "https://b.example", "content": "Nội dung 2"}
            ]
        })
    }

    #[test]
    fn query_enhancement() {
        let (enhanced, injected) = enhance_query("khách sạn gần biển", "Đà Nẵng");
        assert_eq!(enhanced, "khách sạn gần biển Đà Nẵng");
        assert!(injected);

        let (enhanced, injected) = enhance_query("khách sạn ở Hội An", "Đà Nẵng");
        assert_eq!(enhanced, "khách sạn ở Hội An");
        assert!(!injected);
    }

    #[test]
    fn truncation_is_char_safe() {
        assert_eq!(truncate_chars("ẩm thực", 3), "ẩm ...");
        assert_eq!(truncate_chars("ngắn", 10), "ngắn");
    }

    #[tokio::test]
    async fn off_topic_query_refused_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tool = TourismSearchTool::new(client_for(&server), "Đà Nẵng".to_string(), 3);
        let outcome = tool.call(json!({"query": "giải phương trình bậc hai"})).await;

        let ToolOutcome::Refused(refusal) = outcome else {
            panic!("expected refusal");
        };
        assert_eq!(refusal.kind, RefusalKind::Scope);
        assert!(refusal.message.contains("không thuộc phạm vi hỗ trợ"));
    }

    #[tokio::test]
    async fn out_of_region_refused_before_topic_check() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tool = TourismSearchTool::new(client_for(&server), "Đà Nẵng".to_string(), 3);
        // Query carries tourism keywords, but the region block wins.
        let outcome = tool.call(json!({"query": "khách sạn ở Hà Nội"})).await;

        let ToolOutcome::Refused(refusal) = outcome else {
            panic!("expected refusal");
        };
        assert_eq!(refusal.kind, RefusalKind::Scope);
        assert!(refusal.message.contains("Đà Nẵng - Quảng Nam"));
        assert!(refusal.message.contains("địa điểm khác"));
    }

    #[tokio::test]
    async fn auto_injected_region_gets_disclosure_note() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(hits_body()))
            .mount(&server)
            .await;

        let tool = TourismSearchTool::new(client_for(&server), "Đà Nẵng".to_string(), 3);
        let outcome = tool.call(json!({"query": "khách sạn gần biển"})).await;

        let ToolOutcome::Content(text) = outcome else {
            panic!("expected content");
        };
        assert!(text.contains("Tôi chỉ cung cấp thông tin du lịch ở Đà Nẵng - Quảng Nam."));
        assert!(text.contains("Bài 1"));
    }

    #[tokio::test]
    async fn explicit_region_skips_disclosure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(hits_body()))
            .mount(&server)
            .await;

        let tool = TourismSearchTool::new(client_for(&server), "Đà Nẵng".to_string(), 3);
        let outcome = tool.call(json!({"query": "khách sạn ở Hội An"})).await;

        let ToolOutcome::Content(text) = outcome else {
            panic!("expected content");
        };
        assert!(text.contains("Kết quả tìm kiếm du lịch cho \"khách sạn ở Hội An\""));
        assert!(!text.contains("Lần sau bạn có thể hỏi trực tiếp"));
    }

    #[tokio::test]
    async fn empty_results_become_empty_refusal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let tool = TourismSearchTool::new(client_for(&server), "Đà Nẵng".to_string(), 3);
        let outcome = tool.call(json!({"query": "khách sạn ở Hội An"})).await;

        let ToolOutcome::Refused(refusal) = outcome else {
            panic!("expected refusal");
        };
        assert_eq!(refusal.kind, RefusalKind::Provider("empty"));
    }

    #[tokio::test]
    async fn event_search_formats_numbered_report() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(hits_body()))
            .mount(&server)
            .await;

        let tool = EventSearchTool::new(client_for(&server), 5, None);
        let outcome = tool.call(json!({"query": "lễ hội đèn lồng Hội An"})).await;

        let ToolOutcome::Content(text) = outcome else {
            panic!("expected content");
        };
        assert!(text.starts_with("🔍 **Tìm kiếm sâu cho:** lễ hội đèn lồng Hội An"));
        assert!(text.contains("**1. Bài 1**"));
        assert!(text.contains("**2. Bài 2**"));
        assert!(text.contains("💡 **Phân tích chi tiết:** Tổng hợp nhanh."));
    }

    #[tokio::test]
    async fn provider_error_field_becomes_unknown_refusal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "quota exceeded"})),
            )
            .mount(&server)
            .await;

        let tool = EventSearchTool::new(client_for(&server), 5, None);
        let outcome = tool.call(json!({"query": "sự kiện cuối tuần"})).await;

        let ToolOutcome::Refused(refusal) = outcome else {
            panic!("expected refusal");
        };
        assert_eq!(refusal.kind, RefusalKind::Provider("unknown"));
        assert!(refusal.message.contains("quota exceeded"));
    }
}
