use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing::{info, warn};
use url::Url;

use crate::api::gemini_api::GeminiApi;
use crate::error::AdvisorError;
use crate::service::json_scan::extract_json_object;
use crate::service::prompt::land_recommendation_prompt;
use crate::service::weather::WeatherContext;
use crate::types::aistudio::GenerateContentRequest;
use crate::types::land::LandProfile;

/// Generic advice returned whenever the model cannot be used.
pub static FALLBACK_RECOMMENDATIONS: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "recommendedCrops": [
            {
                "name": "Rice",
                "plantingTime": "June-July",
                "expectedYield": "20-25 quintals per acre",
                "profitPotential": "₹25,000-30,000 per acre",
                "tips": [
                    "Use SRI method for better yields",
                    "Maintain proper water levels",
                    "Apply organic fertilizers for better quality"
                ]
            },
            {
                "name": "Wheat",
                "plantingTime": "November-December",
                "expectedYield": "15-20 quintals per acre",
                "profitPotential": "₹20,000-25,000 per acre",
                "tips": [
                    "Use drought-resistant varieties",
                    "Apply balanced fertilizers",
                    "Ensure proper spacing for optimal growth"
                ]
            }
        ],
        "weatherSummary": "Weather data could not be analyzed at this time. Please check local forecasts for planning.",
        "seasonalForecasts": [
            {
                "name": "Summer",
                "forecast": "Hot and dry conditions expected",
                "suitableCrops": ["Cotton", "Sunflower", "Millet"]
            },
            {
                "name": "Monsoon",
                "forecast": "Good rainfall expected",
                "suitableCrops": ["Rice", "Soybean", "Maize"]
            }
        ],
        "efficiencyTips": [
            "Implement drip irrigation to conserve water",
            "Use soil testing to optimize fertilizer application",
            "Consider intercropping for better land utilization"
        ]
    })
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    Model,
    Fallback,
}

impl RecommendationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            RecommendationSource::Model => "model",
            RecommendationSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub payload: Value,
    pub source: RecommendationSource,
}

impl Recommendation {
    pub fn fallback() -> Self {
        Self {
            payload: FALLBACK_RECOMMENDATIONS.clone(),
            source: RecommendationSource::Fallback,
        }
    }
}

/// Produces crop recommendations for a land profile. Implementations never
/// fail: an unusable upstream yields [`Recommendation::fallback`].
#[async_trait]
pub trait CropAdvisor: Send + Sync {
    async fn recommend(&self, land: &LandProfile, weather: &WeatherContext) -> Recommendation;
}

/// Gemini-backed advisor.
pub struct GeminiAdvisor {
    client: reqwest::Client,
    base_url: Url,
    model: String,
    api_key: Option<String>,
    structured_output: bool,
}

impl GeminiAdvisor {
    pub fn new(
        client: reqwest::Client,
        base_url: Url,
        model: impl Into<String>,
        api_key: Option<String>,
        structured_output: bool,
    ) -> Self {
        Self {
            client,
            base_url,
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            structured_output,
        }
    }

    /// Prompt, call and parse. Any error here means fallback.
    pub async fn generate(
        &self,
        land: &LandProfile,
        weather: &WeatherContext,
    ) -> Result<Value, AdvisorError> {
        let api_key = self.api_key.as_deref().ok_or(AdvisorError::MissingApiKey)?;

        let prompt = land_recommendation_prompt(land, weather);
        let body = GenerateContentRequest::from_prompt(prompt, self.structured_output);

        let resp =
            GeminiApi::generate_content(&self.client, &self.base_url, &self.model, api_key, &body)
                .await?;
        let text = resp.text().ok_or(AdvisorError::EmptyModelResponse)?;

        Ok(extract_json_object(&text)?)
    }
}

#[async_trait]
impl CropAdvisor for GeminiAdvisor {
    async fn recommend(&self, land: &LandProfile, weather: &WeatherContext) -> Recommendation {
        match self.generate(land, weather).await {
            Ok(payload) => {
                info!(
                    outcome = RecommendationSource::Model.as_str(),
                    model = %self.model,
                    location = %land.location,
                    "land recommendations generated"
                );
                Recommendation {
                    payload,
                    source: RecommendationSource::Model,
                }
            }
            Err(e) => {
                warn!(
                    outcome = RecommendationSource::Fallback.as_str(),
                    model = %self.model,
                    location = %land.location,
                    error = %e,
                    "AI land recommendation failed; serving fallback"
                );
                Recommendation::fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn land() -> LandProfile {
        LandProfile {
            location: "Pune, Maharashtra".into(),
            land_size: 2.0,
            soil_type: "Loamy".into(),
            soil_ph: 6.8,
            water_source: "Borewell".into(),
            previous_crop: None,
            organic_farming: false,
            budget: None,
            additional_info: None,
        }
    }

    #[tokio::test]
    async fn missing_key_fails_fast_and_falls_back() {
        let advisor = GeminiAdvisor::new(
            reqwest::Client::new(),
            Url::parse("http://127.0.0.1:9/").unwrap(),
            "gemini-2.0-flash",
            Some("   ".into()),
            true,
        );
        let weather = WeatherContext::Unavailable("n/a".into());

        assert!(matches!(
            advisor.generate(&land(), &weather).await,
            Err(AdvisorError::MissingApiKey)
        ));
        assert_eq!(
            advisor.recommend(&land(), &weather).await,
            Recommendation::fallback()
        );
    }

    #[test]
    fn fallback_offers_rice_and_wheat() {
        let crops: Vec<&str> = FALLBACK_RECOMMENDATIONS["recommendedCrops"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|c| c["name"].as_str())
            .collect();
        assert_eq!(crops, ["Rice", "Wheat"]);
        assert_eq!(
            FALLBACK_RECOMMENDATIONS["seasonalForecasts"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
        assert_eq!(
            FALLBACK_RECOMMENDATIONS["efficiencyTips"]
                .as_array()
                .unwrap()
                .len(),
            3
        );
    }
}
