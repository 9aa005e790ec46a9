#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::HeaderMap},
};
use farm_advisor::db::{
    AssessmentRecord, AssessmentStore, AssessmentSummary, NewAssessment, SqliteStorage,
};
use farm_advisor::service::advisor::{CropAdvisor, Recommendation, RecommendationSource};
use farm_advisor::service::weather::{StaticWeather, WeatherContext, WeatherProvider, WeatherSnapshot};
use farm_advisor::types::land::LandProfile;
use farm_advisor::{AdvisorError, AdvisorState, advisor_router};
use serde_json::{Value, json};
use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

/// Temp-file SQLite store, removed on drop.
pub struct TempStore {
    pub storage: SqliteStorage,
    path: PathBuf,
}

impl TempStore {
    pub async fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();

        let mut path = std::env::temp_dir();
        path.push(format!(
            "farm-advisor-{tag}-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));

        let url = format!("sqlite:{}", path.display());
        let storage = SqliteStorage::connect(&url, 4, Duration::from_secs(5))
            .await
            .expect("failed to open sqlite store");
        storage.init_schema().await.expect("failed to init schema");
        Self { storage, path }
    }

    pub async fn add_farmer(&self, username: &str) -> i64 {
        let result = sqlx::query("INSERT INTO farmers (username, password, location) VALUES (?, ?, ?)")
            .bind(username)
            .bind("not-a-real-hash")
            .bind("Pune, Maharashtra")
            .execute(self.storage.pool())
            .await
            .expect("failed to insert farmer");
        result.last_insert_rowid()
    }
}

impl Drop for TempStore {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Store wrapper counting every call that reaches the database.
pub struct CountingStore {
    inner: SqliteStorage,
    pub calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: SqliteStorage) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssessmentStore for CountingStore {
    async fn init_schema(&self) -> Result<(), AdvisorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.init_schema().await
    }

    async fn insert(&self, new: NewAssessment) -> Result<i64, AdvisorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(new).await
    }

    async fn list_by_farmer(&self, farmer_id: i64) -> Result<Vec<AssessmentSummary>, AdvisorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_by_farmer(farmer_id).await
    }

    async fn get(&self, id: i64) -> Result<Option<AssessmentRecord>, AdvisorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(id).await
    }
}

/// Advisor returning a canned payload and recording what it was asked.
pub struct ScriptedAdvisor {
    pub payload: Value,
    pub seen: Mutex<Vec<(LandProfile, WeatherContext)>>,
}

impl ScriptedAdvisor {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl CropAdvisor for ScriptedAdvisor {
    async fn recommend(&self, land: &LandProfile, weather: &WeatherContext) -> Recommendation {
        self.seen
            .lock()
            .unwrap()
            .push((land.clone(), weather.clone()));
        Recommendation {
            payload: self.payload.clone(),
            source: RecommendationSource::Model,
        }
    }
}

/// Weather provider that counts lookups and optionally fails them.
pub struct CountingWeather {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl CountingWeather {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for CountingWeather {
    async fn forecast(&self, city: &str) -> Result<WeatherSnapshot, AdvisorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AdvisorError::Weather("simulated outage".to_string()));
        }
        StaticWeather.forecast(city).await
    }
}

pub fn sample_payload() -> Value {
    json!({
        "recommendedCrops": [{
            "name": "Soybean",
            "plantingTime": "June",
            "expectedYield": "8-10 quintals per acre",
            "profitPotential": "₹30,000 per acre",
            "tips": ["Treat seed with Rhizobium"]
        }],
        "weatherSummary": "Warm with monsoon rains",
        "seasonalForecasts": [],
        "efficiencyTips": ["Mulch between rows"]
    })
}

pub fn pune_request() -> Value {
    json!({
        "location": "Pune, Maharashtra",
        "landSize": 2,
        "soilType": "Loamy",
        "soilPh": 6.8,
        "waterSource": "Borewell"
    })
}

pub fn app(
    store: Arc<dyn AssessmentStore>,
    advisor: Arc<dyn CropAdvisor>,
    weather: Arc<dyn WeatherProvider>,
) -> Router {
    advisor_router(AdvisorState::new(store, advisor, weather))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");

    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not JSON")
    };

    TestResponse {
        status,
        headers,
        body,
    }
}
