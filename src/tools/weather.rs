//! Weather adapters backed by the OpenWeatherMap HTTP API
//!
//! Two adapters share one client: current conditions and a 2-3 day
//! forecast. Both validate their location argument against the served
//! allow-list before any network call, and both convert every provider
//! failure into a tagged refusal. Calls are single-attempt with a fixed
//! timeout; a timeout is a refusal, never a retry.

use super::{ProviderError, Tool, ToolMetadata, ToolOutcome, ToolParameter};
use crate::config::WeatherConfig;
use crate::policy::location::{self, Location};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Local, NaiveDate, Weekday};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

const UNSUPPORTED_LOCATION_NOTICE: &str = "\n\n🌍 Chỉ cung cấp thời tiết cho 2 địa điểm:\n\
• 🏙️ Đà Nẵng (Da Nang, DaNang)\n\
• 🏮 Hội An (Hoi An, HoiAn)\n\n\
💡 Vui lòng nhập 'đà nẵng' hoặc 'hội an'.";

/// Current readings as returned by the provider, reduced to the fields
/// the formatter needs.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub main: MainReadings,
    pub weather: Vec<ConditionReading>,
    #[serde(default)]
    pub wind: WindReadings,
    #[serde(default)]
    pub clouds: CloudReadings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionReading {
    pub main: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindReadings {
    pub speed: Option<f64>,
    pub deg: Option<f64>,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudReadings {
    #[serde(default)]
    pub all: f64,
}

/// One 3-hour forecast interval.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastSlot {
    pub dt: i64,
    pub main: SlotMain,
    pub weather: Vec<ConditionReading>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotMain {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    list: Vec<ForecastSlot>,
}

/// Single-attempt HTTP client for the weather provider.
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    units: String,
    lang: String,
    timeout_secs: u64,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            units: config.units.clone(),
            lang: config.lang.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    pub async fn current(&self, location: Location) -> Result<CurrentConditions, ProviderError> {
        let body = self.fetch("weather", location).await?;
        serde_json::from_value(body)
            .map_err(|e| ProviderError::Other(format!("malformed payload: {}", e)))
    }

    pub async fn forecast(&self, location: Location) -> Result<Vec<ForecastSlot>, ProviderError> {
        let body = self.fetch("forecast", location).await?;
        let payload: ForecastPayload = serde_json::from_value(body)
            .map_err(|e| ProviderError::Other(format!("malformed payload: {}", e)))?;
        Ok(payload.list)
    }

    /// GET one endpoint and normalize the provider's status conventions:
    /// HTTP 401 for auth, numeric `cod` 200 or string `cod` "200" for
    /// success, string `cod` "404" for unknown location.
    async fn fetch(&self, endpoint: &str, location: Location) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/{}?appid={}&q={}&units={}&lang={}",
            self.base_url,
            endpoint,
            self.api_key,
            location.provider_query(),
            self.units,
            self.lang
        );

        tracing::debug!("Weather request: GET /{} for {}", endpoint, location);

        let request = self.client.get(&url).send();
        let response = match timeout(Duration::from_secs(self.timeout_secs), request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ProviderError::from_transport(e)),
            Err(_) => return Err(ProviderError::Timeout),
        };

        if response.status().as_u16() == 401 {
            return Err(ProviderError::Auth);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Other(format!("malformed payload: {}", e)))?;

        match body.get("cod") {
            Some(Value::Number(code)) if code.as_i64() == Some(200) => Ok(body),
            Some(Value::String(code)) if code == "200" => Ok(body),
            Some(Value::String(code)) if code == "404" => {
                Err(ProviderError::NotFound(location.display_name().to_string()))
            }
            _ => {
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Không rõ lỗi.");
                Err(ProviderError::Other(message.to_string()))
            }
        }
    }
}

/// Rain-probability bucket from the categorical condition and cloud cover.
pub fn rain_probability_bucket(condition: &str, cloud_cover: f64) -> &'static str {
    match condition {
        "Rain" | "Drizzle" => "90-100%",
        "Thunderstorm" => "95-100%",
        "Clouds" if cloud_cover > 70.0 => "20-40%",
        "Clouds" if cloud_cover > 50.0 => "10-20%",
        _ => "0%",
    }
}

/// At most one advice line, by temperature/condition precedence.
pub fn advice_line(temp: f64, condition: &str, humidity: f64) -> Option<&'static str> {
    if temp > 30.0 {
        Some("Thời tiết khá nóng, nên mang theo nước và kem chống nắng!")
    } else if temp < 15.0 {
        Some("Thời tiết mát, nên mang theo áo ấm!")
    } else if condition == "Rain" {
        Some("Có mưa, nhớ mang theo ô hoặc áo mưa!")
    } else if humidity > 80.0 {
        Some("Độ ẩm cao, có thể cảm thấy oi bức!")
    } else {
        None
    }
}

fn weather_emoji(condition: &str) -> &'static str {
    match condition {
        "Clear" => "☀️",
        "Clouds" => "☁️",
        "Rain" => "🌧️",
        "Drizzle" => "🌦️",
        "Thunderstorm" => "⛈️",
        "Snow" => "❄️",
        "Mist" | "Fog" | "Haze" => "🌫️",
        _ => "🌤️",
    }
}

fn wind_direction(deg: Option<f64>) -> &'static str {
    match deg {
        None => "Không có thông tin",
        Some(deg) => {
            const DIRECTIONS: [&str; 8] = [
                "Bắc",
                "Đông Bắc",
                "Đông",
                "Đông Nam",
                "Nam",
                "Tây Nam",
                "Tây",
                "Tây Bắc",
            ];
            let idx = ((deg / 45.0).round() as usize) % 8;
            DIRECTIONS[idx]
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn location_note(location: Location) -> &'static str {
    match location {
        Location::DaNang => "🏙️ Thông tin thời tiết cho thành phố Đà Nẵng",
        Location::HoiAn => "🏮 Thông tin thời tiết cho phố cổ Hội An",
    }
}

/// Render current conditions into the fixed report layout.
pub fn format_current(location: Location, conditions: &CurrentConditions) -> String {
    let condition = conditions
        .weather
        .first()
        .map(|w| w.main.as_str())
        .unwrap_or("");
    let description = conditions
        .weather
        .first()
        .map(|w| w.description.as_str())
        .unwrap_or("");
    let cloud_cover = conditions.clouds.all;

    let mut report = format!(
        "{} Thời tiết hiện tại tại {}:\n",
        weather_emoji(condition),
        location.display_name()
    );
    report += &format!("- Nhiệt độ: {}°C\n", conditions.main.temp);
    report += &format!("- Tình trạng: {}\n", capitalize(description));
    report += &format!("- Độ che phủ mây: {}%\n", cloud_cover);
    report += &format!(
        "- Xác suất có mưa: {}\n",
        rain_probability_bucket(condition, cloud_cover)
    );

    if let Some(speed) = conditions.wind.speed {
        report += &format!("- Tốc độ gió: {} m/s", speed);
        if let Some(gust) = conditions.wind.gust {
            report += &format!(" (giật tới {} m/s)", gust);
        }
        report += &format!(" - Hướng: {}\n", wind_direction(conditions.wind.deg));
    }

    if let Some(advice) = advice_line(conditions.main.temp, condition, conditions.main.humidity) {
        report += &format!("\n💡 Lời khuyên: {}", advice);
    }

    report += &format!("\n{}", location_note(location));
    report
}

/// Per-date forecast aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub rain_probability: f64,
}

/// Bucket 3-hour slots by local calendar date, drop today and earlier,
/// and aggregate the first `days` future dates in ascending order.
pub fn summarize_forecast(
    slots: &[ForecastSlot],
    today: NaiveDate,
    days: usize,
) -> Vec<DailyForecast> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ForecastSlot>> = BTreeMap::new();

    for slot in slots {
        let Some(instant) = DateTime::from_timestamp(slot.dt, 0) else {
            continue;
        };
        let date = instant.with_timezone(&Local).date_naive();
        if date > today {
            by_date.entry(date).or_default().push(slot);
        }
    }

    by_date
        .into_iter()
        .take(days)
        .map(|(date, day_slots)| {
            let temps: Vec<f64> = day_slots.iter().map(|s| s.main.temp).collect();
            let rainy = day_slots
                .iter()
                .filter(|s| {
                    s.weather
                        .first()
                        .map(|w| matches!(w.main.as_str(), "Rain" | "Drizzle" | "Thunderstorm"))
                        .unwrap_or(false)
                })
                .count();

            DailyForecast {
                date,
                avg_temp: temps.iter().sum::<f64>() / temps.len() as f64,
                min_temp: temps.iter().cloned().fold(f64::INFINITY, f64::min),
                max_temp: temps.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                rain_probability: rainy as f64 / day_slots.len() as f64 * 100.0,
            }
        })
        .collect()
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Thứ 2",
        Weekday::Tue => "Thứ 3",
        Weekday::Wed => "Thứ 4",
        Weekday::Thu => "Thứ 5",
        Weekday::Fri => "Thứ 6",
        Weekday::Sat => "Thứ 7",
        Weekday::Sun => "Chủ nhật",
    }
}

/// Render the per-date aggregates into the fixed forecast layout.
pub fn format_forecast(location: Location, days: usize, daily: &[DailyForecast]) -> String {
    let mut report = format!(
        "📅 Dự báo thời tiết {} ngày tới tại {}:\n\n",
        days,
        location.display_name()
    );

    for (i, day) in daily.iter().enumerate() {
        report += &format!(
            "🗓️ **Ngày {} ({}, {})**\n",
            i + 1,
            weekday_label(day.date.weekday()),
            day.date.format("%d/%m")
        );
        report += &format!(
            "   - Nhiệt độ: {:.1}°C ({:.1}°C - {:.1}°C)\n",
            day.avg_temp, day.min_temp, day.max_temp
        );
        report += &format!("   - Xác suất có mưa: {:.0}%\n\n", day.rain_probability);
    }

    report += match location {
        Location::DaNang => "🏙️ Dự báo cho thành phố Đà Nẵng",
        Location::HoiAn => "🏮 Dự báo cho phố cổ Hội An",
    };
    report
}

fn unsupported_location_refusal(raw: &str) -> ToolOutcome {
    ToolOutcome::validation_refusal(format!(
        "❌ Địa điểm '{}' không được hỗ trợ.{}",
        raw, UNSUPPORTED_LOCATION_NOTICE
    ))
}

fn provider_refusal_current(error: ProviderError, location: Location) -> ToolOutcome {
    let message = match &error {
        ProviderError::Timeout => "❌ Hết thời gian chờ khi kết nối API thời tiết.".to_string(),
        ProviderError::Connection(_) => "❌ Không thể kết nối tới dịch vụ thời tiết.".to_string(),
        ProviderError::Auth => {
            "❌ Lỗi xác thực API Key. Vui lòng kiểm tra lại API Key.".to_string()
        }
        ProviderError::NotFound(_) => format!(
            "❌ Không tìm thấy thông tin thời tiết cho {} trong hệ thống.",
            location.display_name()
        ),
        ProviderError::Empty => "❌ Không có dữ liệu thời tiết.".to_string(),
        ProviderError::Other(message) => format!("⚠️ Có lỗi xảy ra: {}", message),
    };
    ToolOutcome::provider_refusal(&error, message)
}

fn provider_refusal_forecast(error: ProviderError, location: Location) -> ToolOutcome {
    let message = match &error {
        ProviderError::Timeout => {
            "❌ Hết thời gian chờ khi kết nối API dự báo thời tiết.".to_string()
        }
        ProviderError::Connection(_) => {
            "❌ Không thể kết nối tới dịch vụ dự báo thời tiết.".to_string()
        }
        ProviderError::Auth => {
            "❌ Lỗi xác thực API Key. Vui lòng kiểm tra lại API Key.".to_string()
        }
        ProviderError::NotFound(_) => format!(
            "❌ Không tìm thấy dữ liệu dự báo thời tiết cho {}.",
            location.display_name()
        ),
        ProviderError::Empty => "❌ Không có dữ liệu dự báo cho các ngày tới.".to_string(),
        ProviderError::Other(message) => format!("⚠️ Có lỗi xảy ra: {}", message),
    };
    ToolOutcome::provider_refusal(&error, message)
}

/// Adapter for current conditions.
pub struct CurrentWeatherTool {
    client: Arc<WeatherClient>,
}

impl CurrentWeatherTool {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CurrentWeatherTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: "get_weather".to_string(),
            description: "Lấy thông tin thời tiết hiện tại tại Đà Nẵng hoặc Hội An.".to_string(),
            parameters: vec![ToolParameter {
                name: "location".to_string(),
                param_type: "string".to_string(),
                description: "Tên địa điểm ('đà nẵng' hoặc 'hội an')".to_string(),
                required: true,
            }],
        }
    }

    async fn call(&self, args: Value) -> ToolOutcome {
        let raw = args["location"].as_str().unwrap_or("");
        let Some(location) = location::validate(raw) else {
            return unsupported_location_refusal(raw);
        };

        match self.client.current(location).await {
            Ok(conditions) => ToolOutcome::content(format_current(location, &conditions)),
            Err(error) => {
                tracing::warn!("get_weather refused: [{}] {}", error.tag(), error);
                provider_refusal_current(error, location)
            }
        }
    }
}

/// Adapter for the 2-3 day forecast.
pub struct ForecastTool {
    client: Arc<WeatherClient>,
}

impl ForecastTool {
    pub fn new(client: Arc<WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ForecastTool {
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata {
            name: "get_weather_forecast".to_string(),
            description: "Dự báo thời tiết 2-3 ngày tới (từ ngày mai) tại Đà Nẵng hoặc Hội An."
                .to_string(),
            parameters: vec![
                ToolParameter {
                    name: "location".to_string(),
                    param_type: "string".to_string(),
                    description: "Tên địa điểm ('đà nẵng' hoặc 'hội an')".to_string(),
                    required: true,
                },
                ToolParameter {
                    name: "days".to_string(),
                    param_type: "integer".to_string(),
                    description: "Số ngày dự báo (2 hoặc 3) - mặc định 3 ngày".to_string(),
                    required: false,
                },
            ],
        }
    }

    async fn call(&self, args: Value) -> ToolOutcome {
        // Day-count gate runs before anything touches the network.
        let days = args["days"].as_u64().unwrap_or(3);
        if days != 2 && days != 3 {
            return ToolOutcome::validation_refusal("❌ Chỉ hỗ trợ dự báo cho 2 hoặc 3 ngày tới.");
        }

        let raw = args["location"].as_str().unwrap_or("");
        let Some(location) = location::validate(raw) else {
            return unsupported_location_refusal(raw);
        };

        let slots = match self.client.forecast(location).await {
            Ok(slots) => slots,
            Err(error) => {
                tracing::warn!("get_weather_forecast refused: [{}] {}", error.tag(), error);
                return provider_refusal_forecast(error, location);
            }
        };

        let today = Local::now().date_naive();
        let daily = summarize_forecast(&slots, today, days as usize);
        if daily.is_empty() {
            return provider_refusal_forecast(ProviderError::Empty, location);
        }

        ToolOutcome::content(format_forecast(location, days as usize, &daily))
    }
}
