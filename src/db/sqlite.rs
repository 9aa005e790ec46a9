use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use std::time::Duration;

use crate::db::models::{AssessmentRecord, AssessmentSummary, DbAssessment, NewAssessment};
use crate::db::schema::{SQLITE_INIT, statements};
use crate::db::{AssessmentStore, map_insert_error};
use crate::error::AdvisorError;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `url`.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, AdvisorError> {
        let connect_opts = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(connect_opts)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn row_to_model(row: SqliteRow) -> Result<DbAssessment, AdvisorError> {
        let organic_i: i64 = row.try_get("organic_farming")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(DbAssessment {
            id: row.try_get("id")?,
            farmer_id: row.try_get("farmer_id")?,
            location: row.try_get("location")?,
            land_size: row.try_get("land_size")?,
            soil_type: row.try_get("soil_type")?,
            soil_ph: row.try_get("soil_ph")?,
            water_source: row.try_get("water_source")?,
            previous_crop: row.try_get("previous_crop")?,
            organic_farming: organic_i != 0,
            budget: row.try_get("budget")?,
            additional_info: row.try_get("additional_info")?,
            recommendations: row.try_get("recommendations")?,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, AdvisorError> {
    let ts = DateTime::parse_from_rfc3339(s)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc);
    Ok(ts)
}

#[async_trait]
impl AssessmentStore for SqliteStorage {
    /// Initialize the schema by executing the bundled DDL.
    async fn init_schema(&self) -> Result<(), AdvisorError> {
        // sqlx::query runs a single statement
        for stmt in statements(SQLITE_INIT) {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn insert(&self, new: NewAssessment) -> Result<i64, AdvisorError> {
        let farmer_id = new.farmer_id;
        let organic_i = if new.organic_farming { 1 } else { 0 };
        let result = sqlx::query(
            r#"
            INSERT INTO land_assessments (
                farmer_id, location, land_size, soil_type, soil_ph, water_source,
                previous_crop, organic_farming, budget, additional_info,
                recommendations, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.farmer_id)
        .bind(new.location)
        .bind(new.land_size)
        .bind(new.soil_type)
        .bind(new.soil_ph)
        .bind(new.water_source)
        .bind(new.previous_crop)
        .bind(organic_i)
        .bind(new.budget)
        .bind(new.additional_info)
        .bind(new.recommendations)
        .bind(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, farmer_id))?;

        Ok(result.last_insert_rowid())
    }

    async fn list_by_farmer(&self, farmer_id: i64) -> Result<Vec<AssessmentSummary>, AdvisorError> {
        let rows = sqlx::query(
            r#"SELECT id, farmer_id, location, soil_type, land_size, created_at
               FROM land_assessments
               WHERE farmer_id = ?
               ORDER BY created_at DESC, id DESC"#,
        )
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<AssessmentSummary, AdvisorError> {
                let created_at: String = row.try_get("created_at")?;
                Ok(AssessmentSummary {
                    id: row.try_get("id")?,
                    farmer_id: row.try_get("farmer_id")?,
                    location: row.try_get("location")?,
                    soil_type: row.try_get("soil_type")?,
                    land_size: row.try_get("land_size")?,
                    created_at: parse_timestamp(&created_at)?,
                })
            })
            .collect()
    }

    async fn get(&self, id: i64) -> Result<Option<AssessmentRecord>, AdvisorError> {
        let row = sqlx::query(
            r#"SELECT id, farmer_id, location, land_size, soil_type, soil_ph,
               water_source, previous_crop, organic_farming, budget,
               additional_info, recommendations, created_at
               FROM land_assessments WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_model)
            .transpose()?
            .map(AssessmentRecord::try_from)
            .transpose()
    }
}
