//! Database module: models, schema and storage backends for assessments.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and conversions
//! - `schema.rs`: SQL DDL for both supported dialects
//! - `sqlite.rs` / `mysql.rs`: [`AssessmentStore`] implementations

pub mod models;
pub mod mysql;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{ConnectionPurpose, DatabaseConfig};
use crate::error::AdvisorError;

pub use models::{AssessmentRecord, AssessmentSummary, NewAssessment};
pub use mysql::MySqlStorage;
pub use sqlite::SqliteStorage;

/// Persistence for land assessments. Every method issues a single statement
/// apart from `init_schema`.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Create all tables if they do not exist.
    async fn init_schema(&self) -> Result<(), AdvisorError>;

    /// Insert an assessment and return its generated id.
    async fn insert(&self, new: NewAssessment) -> Result<i64, AdvisorError>;

    /// Summaries for one farmer, newest first.
    async fn list_by_farmer(&self, farmer_id: i64) -> Result<Vec<AssessmentSummary>, AdvisorError>;

    async fn get(&self, id: i64) -> Result<Option<AssessmentRecord>, AdvisorError>;
}

/// Open the store selected by `cfg` for the given purpose. The URL scheme
/// picks the backend.
pub async fn connect(
    cfg: &DatabaseConfig,
    purpose: ConnectionPurpose,
) -> Result<Arc<dyn AssessmentStore>, AdvisorError> {
    let url = cfg.connection_url(purpose)?;
    let acquire_timeout = Duration::from_secs(cfg.connect_timeout_secs);

    let store: Arc<dyn AssessmentStore> = match url.split_once(':').map(|(scheme, _)| scheme) {
        Some("sqlite") => {
            info!(backend = "sqlite", ?purpose, "opening assessment store");
            Arc::new(SqliteStorage::connect(&url, cfg.max_connections, acquire_timeout).await?)
        }
        Some("mysql") | Some("mariadb") => {
            info!(backend = "mysql", ?purpose, "opening assessment store");
            Arc::new(MySqlStorage::connect(&url, cfg.max_connections, acquire_timeout).await?)
        }
        other => {
            return Err(AdvisorError::UnsupportedDatabase(
                other.unwrap_or_default().to_string(),
            ));
        }
    };
    Ok(store)
}

/// A foreign-key failure on insert means the farmer does not exist.
pub(crate) fn map_insert_error(err: sqlx::Error, farmer_id: i64) -> AdvisorError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            AdvisorError::UnknownFarmer(farmer_id)
        }
        _ => AdvisorError::Database(err),
    }
}
