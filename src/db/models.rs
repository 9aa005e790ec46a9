use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::AdvisorError;
use crate::types::land::LandProfile;

/// Row to insert into `land_assessments`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAssessment {
    pub farmer_id: i64,
    pub location: String,
    pub land_size: f64,
    pub soil_type: String,
    pub soil_ph: f64,
    pub water_source: String,
    pub previous_crop: Option<String>,
    pub organic_farming: bool,
    pub budget: Option<f64>,
    pub additional_info: Option<String>,
    /// Recommendation payload serialized to JSON text.
    pub recommendations: String,
}

impl NewAssessment {
    pub fn new(
        farmer_id: i64,
        land: LandProfile,
        recommendations: &Value,
    ) -> Result<Self, AdvisorError> {
        Ok(Self {
            farmer_id,
            location: land.location,
            land_size: land.land_size,
            soil_type: land.soil_type,
            soil_ph: land.soil_ph,
            water_source: land.water_source,
            previous_crop: land.previous_crop,
            organic_farming: land.organic_farming,
            budget: land.budget,
            additional_info: land.additional_info,
            recommendations: serde_json::to_string(recommendations)?,
        })
    }
}

/// Listing view of an assessment, without the recommendation payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct AssessmentSummary {
    pub id: i64,
    pub farmer_id: i64,
    pub location: String,
    pub soil_type: String,
    pub land_size: f64,
    #[serde(rename = "createdAt")]
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// `land_assessments` row as stored, recommendations still serialized.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbAssessment {
    pub id: i64,
    pub farmer_id: i64,
    pub location: String,
    pub land_size: f64,
    pub soil_type: String,
    pub soil_ph: Option<f64>,
    pub water_source: Option<String>,
    pub previous_crop: Option<String>,
    pub organic_farming: bool,
    pub budget: Option<f64>,
    pub additional_info: Option<String>,
    pub recommendations: String,
    pub created_at: DateTime<Utc>,
}

/// Full assessment with recommendations decoded back to JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentRecord {
    pub id: i64,
    pub farmer_id: i64,
    pub location: String,
    pub land_size: f64,
    pub soil_type: String,
    pub soil_ph: Option<f64>,
    pub water_source: Option<String>,
    pub previous_crop: Option<String>,
    pub organic_farming: bool,
    pub budget: Option<f64>,
    pub additional_info: Option<String>,
    pub recommendations: Value,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbAssessment> for AssessmentRecord {
    type Error = AdvisorError;

    fn try_from(d: DbAssessment) -> Result<Self, Self::Error> {
        Ok(AssessmentRecord {
            recommendations: serde_json::from_str(&d.recommendations)?,
            id: d.id,
            farmer_id: d.farmer_id,
            location: d.location,
            land_size: d.land_size,
            soil_type: d.soil_type,
            soil_ph: d.soil_ph,
            water_source: d.water_source,
            previous_crop: d.previous_crop,
            organic_farming: d.organic_farming,
            budget: d.budget,
            additional_info: d.additional_info,
            created_at: d.created_at,
        })
    }
}
