use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::db::{AssessmentRecord, AssessmentSummary, NewAssessment};
use crate::error::AdvisorError;
use crate::middleware::json_body::JsonBody;
use crate::router::AdvisorState;
use crate::service::weather::WeatherContext;
use crate::types::land::{LandAssessmentRequest, SaveAssessmentRequest, SaveAssessmentResponse};

/// Response header naming where the recommendations came from.
pub const RECOMMENDATION_SOURCE_HEADER: &str = "x-recommendation-source";

/// POST /api/land-assessment -> crop recommendations for the submitted land.
pub async fn assess_land(
    State(state): State<AdvisorState>,
    JsonBody(req): JsonBody<LandAssessmentRequest>,
) -> Result<Response, AdvisorError> {
    let land = req.land.validate()?;
    let city = land.city();

    let weather = match state.weather.forecast(city).await {
        Ok(snapshot) => WeatherContext::Observed(snapshot),
        Err(e) => {
            warn!(city, error = %e, "weather lookup failed; continuing without it");
            WeatherContext::Unavailable(e.to_string())
        }
    };

    let recommendation = state.advisor.recommend(&land, &weather).await;
    info!(
        farmer_id = ?req.farmer_id,
        location = %land.location,
        source = recommendation.source.as_str(),
        "land assessment served"
    );

    Ok((
        [(RECOMMENDATION_SOURCE_HEADER, recommendation.source.as_str())],
        Json(recommendation.payload),
    )
        .into_response())
}

/// POST /api/land-assessment/save -> persists an assessment and its recommendations.
pub async fn save_assessment(
    State(state): State<AdvisorState>,
    JsonBody(req): JsonBody<SaveAssessmentRequest>,
) -> Result<impl IntoResponse, AdvisorError> {
    let (Some(farmer_id), Some(land_details), Some(recommendations)) =
        (req.farmer_id, req.land_details, req.recommendations)
    else {
        return Err(AdvisorError::MissingData);
    };
    if farmer_id.is_blank() || recommendations.is_null() {
        return Err(AdvisorError::MissingData);
    }

    let farmer_id = farmer_id.to_i64().ok_or_else(|| AdvisorError::InvalidField {
        field: "farmerId",
        reason: format!("expected an integer id, got {farmer_id:?}"),
    })?;
    let land = land_details.validate()?;

    let new = NewAssessment::new(farmer_id, land, &recommendations)
        .map_err(AdvisorError::internal("Failed to save assessment"))?;
    let assessment_id = state
        .store
        .insert(new)
        .await
        .map_err(AdvisorError::internal("Failed to save assessment"))?;

    info!(farmer_id, assessment_id, "assessment saved");
    Ok((
        StatusCode::CREATED,
        Json(SaveAssessmentResponse {
            message: "Assessment saved successfully".to_string(),
            assessment_id,
        }),
    ))
}

/// GET /api/land-assessment/{farmer_id} -> assessment summaries, newest first.
pub async fn list_farmer_assessments(
    State(state): State<AdvisorState>,
    Path(farmer_id): Path<String>,
) -> Result<Json<Vec<AssessmentSummary>>, AdvisorError> {
    // A non-numeric id can never match a row.
    let Ok(farmer_id) = farmer_id.trim().parse::<i64>() else {
        return Ok(Json(Vec::new()));
    };

    let summaries = state
        .store
        .list_by_farmer(farmer_id)
        .await
        .map_err(AdvisorError::internal("Failed to fetch assessments"))?;
    Ok(Json(summaries))
}

/// GET /api/land-assessment/details/{assessment_id} -> the full assessment.
pub async fn get_assessment_details(
    State(state): State<AdvisorState>,
    Path(assessment_id): Path<String>,
) -> Result<Json<AssessmentRecord>, AdvisorError> {
    let Ok(assessment_id) = assessment_id.trim().parse::<i64>() else {
        return Err(AdvisorError::AssessmentNotFound);
    };

    state
        .store
        .get(assessment_id)
        .await
        .map_err(AdvisorError::internal("Failed to fetch assessment details"))?
        .map(Json)
        .ok_or(AdvisorError::AssessmentNotFound)
}
