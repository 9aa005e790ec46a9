use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::db::AssessmentStore;
use crate::handlers::land_assessment::{
    assess_land, get_assessment_details, list_farmer_assessments, save_assessment,
};
use crate::service::advisor::CropAdvisor;
use crate::service::weather::WeatherProvider;

/// Per-process collaborators shared by every handler.
#[derive(Clone)]
pub struct AdvisorState {
    pub store: Arc<dyn AssessmentStore>,
    pub advisor: Arc<dyn CropAdvisor>,
    pub weather: Arc<dyn WeatherProvider>,
}

impl AdvisorState {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        advisor: Arc<dyn CropAdvisor>,
        weather: Arc<dyn WeatherProvider>,
    ) -> Self {
        Self {
            store,
            advisor,
            weather,
        }
    }
}

pub fn advisor_router(state: AdvisorState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/land-assessment", post(assess_land))
        .route("/api/land-assessment/save", post(save_assessment))
        .route("/api/land-assessment/{farmer_id}", get(list_farmer_assessments))
        .route(
            "/api/land-assessment/details/{assessment_id}",
            get(get_assessment_details),
        )
        .layer(cors)
        .with_state(state)
}
