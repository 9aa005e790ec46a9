//! Weather context for assessments.
//!
//! [`StaticWeather`] serves fixed demo conditions and is used when no weather
//! key is configured. [`WeatherApiProvider`] talks to a weatherapi.com
//! compatible forecast endpoint. Callers treat every error as "weather
//! unavailable" and carry on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::AdvisorError;
use crate::types::land::format_number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub avgtemp_c: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub day: DaySummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: String,
    pub current: CurrentConditions,
    #[serde(default)]
    pub forecast: Forecast,
}

/// Weather handed to the recommendation prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherContext {
    Observed(WeatherSnapshot),
    Unavailable(String),
}

impl WeatherContext {
    /// One-line description embedded in the prompt.
    pub fn summary(&self) -> String {
        match self {
            WeatherContext::Observed(w) => format!(
                "Current temperature: {}°C, Condition: {}",
                format_number(w.current.temp_c),
                w.current.condition.text
            ),
            WeatherContext::Unavailable(_) => "Weather data is unavailable".to_string(),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(&self, city: &str) -> Result<WeatherSnapshot, AdvisorError>;
}

/// Fixed demo conditions.
#[derive(Debug, Clone, Default)]
pub struct StaticWeather;

#[async_trait]
impl WeatherProvider for StaticWeather {
    async fn forecast(&self, city: &str) -> Result<WeatherSnapshot, AdvisorError> {
        let day = |date: &str, avgtemp_c: f64, text: &str| ForecastDay {
            date: date.to_string(),
            day: DaySummary {
                avgtemp_c,
                condition: Condition {
                    text: text.to_string(),
                },
            },
        };

        Ok(WeatherSnapshot {
            location: city.to_string(),
            current: CurrentConditions {
                temp_c: 28.0,
                condition: Condition {
                    text: "Partly cloudy".to_string(),
                },
            },
            forecast: Forecast {
                forecastday: vec![
                    day("2023-09-01", 27.0, "Sunny"),
                    day("2023-09-02", 28.0, "Partly cloudy"),
                    day("2023-09-03", 26.0, "Light rain"),
                ],
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiForecastResponse {
    location: ApiLocation,
    current: CurrentConditions,
    #[serde(default)]
    forecast: Forecast,
}

/// weatherapi.com `forecast.json` client.
pub struct WeatherApiProvider {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    days: u8,
}

impl WeatherApiProvider {
    pub fn new(client: reqwest::Client, base_url: Url, api_key: String, days: u8) -> Self {
        Self {
            client,
            base_url,
            api_key,
            days,
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn forecast(&self, city: &str) -> Result<WeatherSnapshot, AdvisorError> {
        let mut url = self.base_url.join("v1/forecast.json")?;
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("q", city)
            .append_pair("days", &self.days.to_string());

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AdvisorError::Weather(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AdvisorError::Weather(format!("status {status}")));
        }

        let body: ApiForecastResponse = resp
            .json()
            .await
            .map_err(|e| AdvisorError::Weather(e.to_string()))?;
        debug!(city, resolved = %body.location.name, "weather forecast fetched");

        Ok(WeatherSnapshot {
            location: body.location.name,
            current: body.current,
            forecast: body.forecast,
        })
    }
}
