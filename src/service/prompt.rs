use crate::service::weather::WeatherContext;
use crate::types::land::{LandProfile, format_number};

const RESPONSE_SHAPE: &str = r#"{
  "recommendedCrops": [
    {
      "name": "Crop Name",
      "plantingTime": "Best time to plant",
      "expectedYield": "Expected yield per acre",
      "profitPotential": "Estimated profit potential",
      "tips": ["Specific tip 1", "Specific tip 2", "Specific tip 3"]
    }
  ],
  "weatherSummary": "Brief analysis of weather patterns in the location",
  "seasonalForecasts": [
    {
      "name": "Season name (e.g., Monsoon, Winter)",
      "forecast": "Brief forecast for this season",
      "suitableCrops": ["Crop 1", "Crop 2", "Crop 3"]
    }
  ],
  "efficiencyTips": [
    "Efficiency tip 1",
    "Efficiency tip 2",
    "Efficiency tip 3"
  ]
}"#;

/// Render the land-recommendation prompt sent to the model.
pub fn land_recommendation_prompt(land: &LandProfile, weather: &WeatherContext) -> String {
    let previous_crop = land.previous_crop.as_deref().unwrap_or("Not specified");
    let budget = land
        .budget
        .map(format_number)
        .unwrap_or_else(|| "Not specified".to_string());
    let additional_info = land.additional_info.as_deref().unwrap_or("None provided");
    let organic = if land.organic_farming { "Yes" } else { "No" };

    format!(
        "You are an agricultural expert AI system. Based on the following land details, provide comprehensive recommendations for optimal crops to grow, when to plant them, and efficiency improvements.

Land Details:
- Location: {location}
- Land Size: {land_size} acres
- Soil Type: {soil_type}
- Soil pH: {soil_ph}
- Water Source: {water_source}
- Previous Crop: {previous_crop}
- Organic Farming Interest: {organic}
- Budget: {budget} INR per acre
- Additional Information: {additional_info}
- Weather Information: {weather}

Provide your response in the following JSON structure:
{RESPONSE_SHAPE}

Ensure you recommend crops that are well-suited to the specific soil type, pH level, and local climate conditions. Consider crop rotation benefits if previous crop information is provided. Provide at least 3-5 recommended crops, and make sure your recommendations are practical and economically viable.",
        location = land.location,
        land_size = format_number(land.land_size),
        soil_type = land.soil_type,
        soil_ph = format_number(land.soil_ph),
        water_source = land.water_source,
        weather = weather.summary(),
    )
}
