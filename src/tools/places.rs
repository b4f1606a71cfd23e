//! Semantic place-search adapter
//!
//! The similarity index is an external, read-only collaborator reached
//! through the [`PlaceIndex`] trait. The adapter caps results at five,
//! keeps a single place category per response, and renders every hit
//! into a fixed record template.

use super::{ProviderError, Tool, ToolMetadata, ToolOutcome, ToolParameter};
use crate::config::PlacesConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

/// Fixed result cap for similarity queries.
pub const RESULT_LIMIT: usize = 5;

/// Đà Nẵng districts recognized in queries for metadata filtering.
pub const KNOWN_DISTRICTS: &[&str] = &[
    "hải châu",
    "thanh khê",
    "sơn trà",
    "ngũ hành sơn",
    "liên chiểu",
    "cẩm lệ",
    "hòa vang",
];

/// Equality/membership filter over place metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub categories: Vec<String>,
}

impl PlaceFilter {
    pub fn is_empty(&self) -> bool {
        self.district.is_none() && self.ward.is_none() && self.categories.is_empty()
    }

    /// Build a filter from district mentions in the utterance.
    pub fn from_utterance(utterance: &str) -> Self {
        let lowered = utterance.to_lowercase();
        let district = KNOWN_DISTRICTS
            .iter()
            .find(|district| lowered.contains(*district))
            .map(|district| district.to_string());
        Self {
            district,
            ..Self::default()
        }
    }
}

/// Metadata attached to an indexed place document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceMetadata {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub ward: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub open_close: String,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

/// One ranked document from the similarity index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDocument {
    pub content: String,
    pub metadata: PlaceMetadata,
}

/// External similarity-search capability over the place index.
#[async_trait]
pub trait PlaceIndex: Send + Sync {
    /// Ranked similarity query with a result cap and optional metadata
    /// filter. The index is populated externally and read-only here.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&PlaceFilter>,
    ) -> Result<Vec<PlaceDocument>, ProviderError>;
}

#[derive(Debug, Serialize)]
struct IndexRequest<'a> {
    query: &'a str,
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a PlaceFilter>,
}

#[derive(Debug, Deserialize)]
struct IndexResponse {
    documents: Vec<PlaceDocument>,
}

/// HTTP-backed place index client.
pub struct HttpPlaceIndex {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpPlaceIndex {
    pub fn new(config: &PlacesConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.index_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        }
    }
}

#[async_trait]
impl PlaceIndex for HttpPlaceIndex {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&PlaceFilter>,
    ) -> Result<Vec<PlaceDocument>, ProviderError> {
        let request = IndexRequest {
            query,
            limit,
            filter,
        };

        let call = self
            .client
            .post(format!("{}/query", self.base_url))
            .json(&request)
            .send();

        let response = match timeout(Duration::from_secs(self.timeout_secs), call).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ProviderError::from_transport(e)),
            Err(_) => return Err(ProviderError::Timeout),
        };

        if !response.status().is_success() {
            return Err(ProviderError::Other(format!(
                "index returned status {}",
                response.status()
            )));
        }

        let payload: IndexResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Other(format!("malformed payload: {}", e)))?;
        Ok(payload.documents)
    }
}

fn is_accommodation(category: &str) -> bool {
    let lowered = category.to_lowercase();
    lowered.contains("khách sạn")
        || lowered.contains("hotel")
        || lowered.contains("resort")
        || lowered.contains("homestay")
}

/// Render one document into the fixed record template.
fn format_record(doc: &PlaceDocument) -> String {
    let meta = &doc.metadata;
    let mut record = format!("Tên: {}\n", meta.name);
    record += &format!("Loại: {}\n", meta.category);
    record += &format!("Khu vực: {}, {}\n", meta.ward, meta.district);
    record += &format!("Mô tả: {}\n", doc.content);
    record += &format!("Thời gian mở đóng: {}\n", meta.open_close);
    // Stay-duration suggestions make no sense for lodging
    if !is_accommodation(&meta.category) {
        if let Some(minutes) = meta.duration_minutes {
            record += &format!("Thời gian gợi ý ở lại: {} phút\n", minutes);
        }
    }
    record += "---";
    record
}

/// Restrict ranked documents to the top hit's category so one response
/// never mixes place categories.
pub fn single_category(documents: Vec<PlaceDocument>) -> Vec<PlaceDocument> {
    let Some(lead_category) = documents.first().map(|doc| doc.metadata.category.clone()) else {
        return documents;
    };
    documents
        .into_iter()
        .filter(|doc| doc.metadata.category == lead_category)
        .collect()
}

/// Adapter over the place index.
pub struct PlaceSearchTool {
    index: Arc<dyn PlaceIndex>,
    limit: usize,
}

impl PlaceSearchTool {
    pub fn new(index: Arc<dyn PlaceIndex>, limit: usize) -> Self {
        Self { index, limit }
    }
}

#[async_trait]
impl Tool for PlaceSearchTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: "place_search".to_string(),
            description:
                "Gợi ý địa điểm (quán ăn, cafe, khách sạn, điểm tham quan) tại Đà Nẵng từ dữ liệu địa điểm."
                    .to_string(),
            parameters: vec![
                ToolParameter {
                    name: "query".to_string(),
                    param_type: "string".to_string(),
                    description: "Câu hỏi của người dùng về địa điểm.".to_string(),
                    required: true,
                },
                ToolParameter {
                    name: "district".to_string(),
                    param_type: "string".to_string(),
                    description: "Quận cần lọc kết quả (tùy chọn).".to_string(),
                    required: false,
                },
            ],
        }
    }

    async fn call(&self, args: Value) -> ToolOutcome {
        let query = args["query"].as_str().unwrap_or("").trim();
        if query.is_empty() {
            return ToolOutcome::validation_refusal("❌ Thiếu truy vấn tìm kiếm địa điểm.");
        }

        let filter = match args["district"].as_str() {
            Some(district) => PlaceFilter {
                district: Some(district.to_lowercase()),
                ..PlaceFilter::default()
            },
            None => PlaceFilter::from_utterance(query),
        };
        let filter = if filter.is_empty() {
            None
        } else {
            Some(filter)
        };

        let documents = match self.index.search(query, self.limit, filter.as_ref()).await {
            Ok(documents) => documents,
            Err(error) => {
                tracing::warn!("place_search refused: [{}] {}", error.tag(), error);
                return ToolOutcome::provider_refusal(
                    &error,
                    format!("❌ Lỗi khi truy xuất dữ liệu địa điểm: {}", error),
                );
            }
        };

        if documents.is_empty() {
            let error = ProviderError::Empty;
            return ToolOutcome::provider_refusal(
                &error,
                format!("⚠️ Không tìm thấy địa điểm phù hợp cho '{}'.", query),
            );
        }

        let records: Vec<String> = single_category(documents)
            .iter()
            .take(self.limit)
            .map(format_record)
            .collect();
        ToolOutcome::content(records.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::RefusalKind;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubIndex {
        documents: Vec<PlaceDocument>,
        seen_filters: Mutex<Vec<Option<PlaceFilter>>>,
    }

    impl StubIndex {
        fn new(documents: Vec<PlaceDocument>) -> Self {
            Self {
                documents,
                seen_filters: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PlaceIndex for StubIndex {
        async fn search(
            &self,
            _query: &str,
            limit: usize,
            filter: Option<&PlaceFilter>,
        ) -> Result<Vec<PlaceDocument>, ProviderError> {
            self.seen_filters.lock().unwrap().push(filter.cloned());
            Ok(self.documents.iter().take(limit).cloned().collect())
        }
    }

    fn doc(name: &str, category: &str, duration: Option<u32>) -> PlaceDocument {
        PlaceDocument {
            content: format!("Mô tả về {}", name),
            metadata: PlaceMetadata {
                name: name.to_string(),
                category: category.to_string(),
                ward: "An Hải Bắc".to_string(),
                district: "Sơn Trà".to_string(),
                open_close: "08:00-22:00".to_string(),
                duration_minutes: duration,
            },
        }
    }

    #[test]
    fn district_filter_from_utterance() {
        let filter = PlaceFilter::from_utterance("gợi ý nhà hàng ở Quận Sơn Trà");
        assert_eq!(filter.district.as_deref(), Some("sơn trà"));

        let filter = PlaceFilter::from_utterance("gợi ý nhà hàng ngon");
        assert!(filter.is_empty());
    }

    #[test]
    fn results_never_mix_categories() {
        let docs = vec![
            doc("Quán A", "quán ăn", Some(60)),
            doc("Cafe B", "cafe", Some(45)),
            doc("Quán C", "quán ăn", Some(90)),
        ];
        let kept = single_category(docs);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|d| d.metadata.category == "quán ăn"));
    }

    #[tokio::test]
    async fn records_follow_the_fixed_template() {
        let index = Arc::new(StubIndex::new(vec![doc("Quán A", "quán ăn", Some(60))]));
        let tool = PlaceSearchTool::new(index, RESULT_LIMIT);

        let outcome = tool.call(json!({"query": "quán ăn ngon"})).await;
        let ToolOutcome::Content(text) = outcome else {
            panic!("expected content");
        };
        assert!(text.contains("Tên: Quán A"));
        assert!(text.contains("Loại: quán ăn"));
        assert!(text.contains("Khu vực: An Hải Bắc, Sơn Trà"));
        assert!(text.contains("Thời gian mở đóng: 08:00-22:00"));
        assert!(text.contains("Thời gian gợi ý ở lại: 60 phút"));
        assert!(text.ends_with("---"));
    }

    #[tokio::test]
    async fn hotels_omit_stay_duration() {
        let index = Arc::new(StubIndex::new(vec![doc("KS Biển", "khách sạn", Some(1200))]));
        let tool = PlaceSearchTool::new(index, RESULT_LIMIT);

        let outcome = tool.call(json!({"query": "khách sạn gần biển"})).await;
        let ToolOutcome::Content(text) = outcome else {
            panic!("expected content");
        };
        assert!(!text.contains("Thời gian gợi ý ở lại"));
    }

    #[tokio::test]
    async fn empty_index_result_is_an_empty_refusal() {
        let index = Arc::new(StubIndex::new(vec![]));
        let tool = PlaceSearchTool::new(index, RESULT_LIMIT);

        let outcome = tool.call(json!({"query": "quán ăn ngon"})).await;
        let ToolOutcome::Refused(refusal) = outcome else {
            panic!("expected refusal");
        };
        assert_eq!(refusal.kind, RefusalKind::Provider("empty"));
    }

    #[tokio::test]
    async fn district_mention_is_forwarded_as_filter() {
        let index = Arc::new(StubIndex::new(vec![doc("Quán A", "quán ăn", Some(60))]));
        let tool = PlaceSearchTool::new(Arc::clone(&index) as Arc<dyn PlaceIndex>, RESULT_LIMIT);

        tool.call(json!({"query": "nhà hàng ở quận sơn trà"})).await;

        let seen = index.seen_filters.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].as_ref().and_then(|f| f.district.as_deref()),
            Some("sơn trà")
        );
    }
}
