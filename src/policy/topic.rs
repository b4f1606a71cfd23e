//! Topic classification over static keyword tables
//!
//! Every check here is a case-insensitive substring match against fixed
//! tables. The tables are read-only after startup and safely shared
//! across requests.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Tourism category a query falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TourismCategory {
    Accommodation,
    Attractions,
    Food,
    Activities,
    Transportation,
    Shopping,
    Culture,
}

impl TourismCategory {
    pub const ALL: [TourismCategory; 7] = [
        TourismCategory::Accommodation,
        TourismCategory::Attractions,
        TourismCategory::Food,
        TourismCategory::Activities,
        TourismCategory::Transportation,
        TourismCategory::Shopping,
        TourismCategory::Culture,
    ];

    /// Keywords that put a query in this category.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            TourismCategory::Accommodation => {
                &["khách sạn", "resort", "homestay", "villa", "nhà nghỉ", "lưu trú"]
            }
            TourismCategory::Attractions => &[
                "điểm đến",
                "danh lam",
                "thắng cảnh",
                "du lịch",
                "tham quan",
                "check in",
                "checkin",
            ],
            TourismCategory::Food => &[
                "ẩm thực",
                "món ăn",
                "quán ăn",
                "nhà hàng",
                "cafe",
                "đặc sản",
                "street food",
            ],
            TourismCategory::Activities => &[
                "hoạt động",
                "trải nghiệm",
                "tour",
                "vui chơi",
                "giải trí",
                "festival",
                "lễ hội",
            ],
            TourismCategory::Transportation => {
                &["di chuyển", "giao thông", "xe", "máy bay", "tàu hỏa"]
            }
            TourismCategory::Shopping => {
                &["mua sắm", "chợ", "siêu thị", "shopping", "quà lưu niệm"]
            }
            TourismCategory::Culture => {
                &["văn hóa", "lịch sử", "truyền thống", "chùa", "đền", "bảo tàng"]
            }
        }
    }
}

/// Terms that mark a query as a weather question.
pub const WEATHER_KEYWORDS: &[&str] = &[
    "thời tiết",
    "weather",
    "dự báo",
    "nhiệt độ",
    "nắng",
    "mưa",
];

/// Terms that ask for a multi-day forecast rather than current conditions.
pub const FORECAST_KEYWORDS: &[&str] = &["dự báo", "ngày tới", "ngày mai", "tuần này"];

/// Terms that mark an event / festival query.
pub const EVENT_KEYWORDS: &[&str] = &["sự kiện", "lễ hội", "festival", "concert", "triển lãm"];

/// Places inside the served Đà Nẵng - Quảng Nam region (and its fringe).
pub const SERVED_REGION_ALIASES: &[&str] = &[
    "đà nẵng",
    "da nang",
    "danang",
    "hội an",
    "hoi an",
    "hoian",
    "quảng nam",
    "quang nam",
    "mỹ sơn",
    "my son",
    "myson",
    "bà nà",
    "ba na",
    "bana",
    "sơn trà",
    "son tra",
    "linh ứng",
    "cù lao chàm",
    "cu lao cham",
    "tam kỳ",
    "tam ky",
    "thừa thiên huế",
    "thua thien hue",
    "huế",
    "hue",
];

/// Blocklist of cities and countries the assistant does not serve.
pub const OUT_OF_REGION_ALIASES: &[&str] = &[
    "hà nội",
    "hanoi",
    "ha noi",
    "hồ chí minh",
    "tp hcm",
    "sài gòn",
    "saigon",
    "ho chi minh",
    "nha trang",
    "phú quốc",
    "phu quoc",
    "phuquoc",
    "đà lạt",
    "da lat",
    "dalat",
    "hạ long",
    "ha long",
    "halong",
    "cần thơ",
    "can tho",
    "vũng tàu",
    "vung tau",
    "phan thiết",
    "phan thiet",
    "quy nhơn",
    "quy nhon",
    "singapore",
    "thailand",
    "thái lan",
    "malaysia",
    "bali",
    "tokyo",
    "seoul",
    "paris",
    "london",
    "new york",
    "bangkok",
    "cambodia",
    "campuchia",
    "myanmar",
    "philippines",
    "indonesia",
];

fn contains_any(utterance: &str, keywords: &[&str]) -> bool {
    let lowered = utterance.to_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

/// Whether the utterance is a weather question.
pub fn is_weather_query(utterance: &str) -> bool {
    contains_any(utterance, WEATHER_KEYWORDS)
}

/// Whether the utterance asks for a forecast rather than current weather.
pub fn wants_forecast(utterance: &str) -> bool {
    contains_any(utterance, FORECAST_KEYWORDS)
}

/// Whether the utterance carries any tourism-category keyword.
pub fn is_tourism_query(utterance: &str) -> bool {
    tourism_category(utterance).is_some()
}

/// First tourism category with a keyword present in the utterance.
pub fn tourism_category(utterance: &str) -> Option<TourismCategory> {
    let lowered = utterance.to_lowercase();
    TourismCategory::ALL.into_iter().find(|category| {
        category
            .keywords()
            .iter()
            .any(|keyword| lowered.contains(keyword))
    })
}

/// Whether the utterance asks about events or festivals.
pub fn is_event_query(utterance: &str) -> bool {
    contains_any(utterance, EVENT_KEYWORDS)
}

/// Whether the utterance mentions a place inside the served region.
pub fn mentions_served_region(utterance: &str) -> bool {
    contains_any(utterance, SERVED_REGION_ALIASES)
}

/// Whether the utterance mentions a blocklisted place outside the region.
pub fn mentions_out_of_region(utterance: &str) -> bool {
    contains_any(utterance, OUT_OF_REGION_ALIASES)
}

static DAY_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([23])\s*ngày").expect("day-count pattern"));

/// Requested forecast length, if the utterance names one.
///
/// Only 2 and 3 are extractable; anything else is left to the adapter's
/// own day-count validation.
pub fn requested_day_count(utterance: &str) -> Option<u8> {
    DAY_COUNT_RE
        .captures(&utterance.to_lowercase())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_keywords_match() {
        assert!(is_weather_query("thời tiết Đà Nẵng hôm nay"));
        assert!(is_weather_query("What is the WEATHER like?"));
        assert!(!is_weather_query("khách sạn gần biển"));
    }

    #[test]
    fn forecast_intent_is_detected() {
        assert!(wants_forecast("dự báo 3 ngày tới"));
        assert!(wants_forecast("ngày mai có mưa không"));
        assert!(!wants_forecast("thời tiết hôm nay"));
    }

    #[test]
    fn tourism_categories_match_their_keywords() {
        assert_eq!(
            tourism_category("khách sạn 5 sao gần biển"),
            Some(TourismCategory::Accommodation)
        );
        assert_eq!(
            tourism_category("món ăn đặc sản"),
            Some(TourismCategory::Food)
        );
        assert_eq!(
            tourism_category("bảo tàng Chăm"),
            Some(TourismCategory::Culture)
        );
        assert_eq!(tourism_category("2 + 2 bằng mấy"), None);
    }

    #[test]
    fn out_of_region_blocklist_matches() {
        assert!(mentions_out_of_region("khách sạn ở Hà Nội"));
        assert!(mentions_out_of_region("tour Bangkok giá rẻ"));
        assert!(!mentions_out_of_region("khách sạn ở Hội An"));
    }

    #[test]
    fn served_region_aliases_match() {
        assert!(mentions_served_region("quán ăn ngon ở Sơn Trà"));
        assert!(mentions_served_region("tour Bà Nà Hills"));
        assert!(!mentions_served_region("quán ăn ngon gần đây"));
    }

    #[test]
    fn day_count_extraction() {
        assert_eq!(requested_day_count("dự báo 2 ngày tới"), Some(2));
        assert_eq!(requested_day_count("dự báo 3 ngày"), Some(3));
        assert_eq!(requested_day_count("dự báo 5 ngày"), None);
        assert_eq!(requested_day_count("dự báo tuần này"), None);
    }
}
