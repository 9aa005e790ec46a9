use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::AdvisorError;

/// A measurement that may arrive as a JSON number or as the string an HTML
/// input produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl Quantity {
    /// Missing in the form sense: blank text or zero.
    pub fn is_blank(&self) -> bool {
        match self {
            Quantity::Number(n) => *n == 0.0 || n.is_nan(),
            Quantity::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Quantity::Number(n) => Some(*n),
            Quantity::Text(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|n| n.is_finite())
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Quantity::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            Quantity::Number(_) => None,
            Quantity::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Number(n) => f.write_str(&format_number(*n)),
            Quantity::Text(s) => f.write_str(s),
        }
    }
}

/// Render a number the way a person writes it: `2` rather than `2.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Land fields as submitted by the assessment form. Every field is optional
/// at this layer; [`LandDetails::validate`] decides what is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandDetails {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub land_size: Option<Quantity>,
    #[serde(default)]
    pub soil_type: Option<String>,
    #[serde(default)]
    pub soil_ph: Option<Quantity>,
    #[serde(default)]
    pub water_source: Option<String>,
    #[serde(default)]
    pub previous_crop: Option<String>,
    #[serde(default)]
    pub organic_farming: Option<bool>,
    #[serde(default)]
    pub budget: Option<Quantity>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

/// Land details with every required field present and measurements numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct LandProfile {
    pub location: String,
    pub land_size: f64,
    pub soil_type: String,
    pub soil_ph: f64,
    pub water_source: String,
    pub previous_crop: Option<String>,
    pub organic_farming: bool,
    pub budget: Option<f64>,
    pub additional_info: Option<String>,
}

impl LandProfile {
    /// City portion of the location, used for weather lookups.
    pub fn city(&self) -> &str {
        self.location
            .split(',')
            .next()
            .map(str::trim)
            .unwrap_or_default()
    }
}

fn present_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn present_quantity(value: &Option<Quantity>) -> Option<&Quantity> {
    value.as_ref().filter(|q| !q.is_blank())
}

fn numeric(field: &'static str, q: &Quantity) -> Result<f64, AdvisorError> {
    q.to_f64().ok_or_else(|| AdvisorError::InvalidField {
        field,
        reason: format!("expected a number, got {q:?}"),
    })
}

impl LandDetails {
    pub fn validate(&self) -> Result<LandProfile, AdvisorError> {
        let (Some(location), Some(land_size), Some(soil_type), Some(soil_ph), Some(water_source)) = (
            present_text(&self.location),
            present_quantity(&self.land_size),
            present_text(&self.soil_type),
            present_quantity(&self.soil_ph),
            present_text(&self.water_source),
        ) else {
            return Err(AdvisorError::MissingFields);
        };

        let budget = match present_quantity(&self.budget) {
            Some(q) => Some(numeric("budget", q)?),
            None => None,
        };

        Ok(LandProfile {
            location: location.to_string(),
            land_size: numeric("landSize", land_size)?,
            soil_type: soil_type.to_string(),
            soil_ph: numeric("soilPh", soil_ph)?,
            water_source: water_source.to_string(),
            previous_crop: present_text(&self.previous_crop).map(str::to_string),
            organic_farming: self.organic_farming.unwrap_or(false),
            budget,
            additional_info: present_text(&self.additional_info).map(str::to_string),
        })
    }
}

/// Body of `POST /api/land-assessment`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandAssessmentRequest {
    #[serde(default)]
    pub farmer_id: Option<Quantity>,
    #[serde(flatten)]
    pub land: LandDetails,
}

/// Body of `POST /api/land-assessment/save`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAssessmentRequest {
    #[serde(default)]
    pub farmer_id: Option<Quantity>,
    #[serde(default)]
    pub land_details: Option<LandDetails>,
    #[serde(default)]
    pub recommendations: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAssessmentResponse {
    pub message: String,
    pub assessment_id: i64,
}
