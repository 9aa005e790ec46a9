use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::{MySql, Pool};
use std::str::FromStr;
use std::time::Duration;

use crate::db::models::{AssessmentRecord, AssessmentSummary, DbAssessment, NewAssessment};
use crate::db::schema::{MYSQL_INIT, statements};
use crate::db::{AssessmentStore, map_insert_error};
use crate::error::AdvisorError;

pub type MySqlPool = Pool<MySql>;

#[derive(Clone)]
pub struct MySqlStorage {
    pool: MySqlPool,
}

impl MySqlStorage {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, AdvisorError> {
        let connect_opts = MySqlConnectOptions::from_str(url)?;
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_with(connect_opts)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl AssessmentStore for MySqlStorage {
    async fn init_schema(&self) -> Result<(), AdvisorError> {
        for stmt in statements(MYSQL_INIT) {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn insert(&self, new: NewAssessment) -> Result<i64, AdvisorError> {
        let farmer_id = new.farmer_id;
        let result = sqlx::query(
            r#"
            INSERT INTO land_assessments (
                farmer_id, location, land_size, soil_type, soil_ph, water_source,
                previous_crop, organic_farming, budget, additional_info, recommendations
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.farmer_id)
        .bind(new.location)
        .bind(new.land_size)
        .bind(new.soil_type)
        .bind(new.soil_ph)
        .bind(new.water_source)
        .bind(new.previous_crop)
        .bind(new.organic_farming)
        .bind(new.budget)
        .bind(new.additional_info)
        .bind(new.recommendations)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, farmer_id))?;

        Ok(result.last_insert_id() as i64)
    }

    async fn list_by_farmer(&self, farmer_id: i64) -> Result<Vec<AssessmentSummary>, AdvisorError> {
        let rows = sqlx::query_as::<_, AssessmentSummary>(
            r#"SELECT id, farmer_id, location, soil_type, land_size, created_at AS createdAt
               FROM land_assessments
               WHERE farmer_id = ?
               ORDER BY created_at DESC, id DESC"#,
        )
        .bind(farmer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<AssessmentRecord>, AdvisorError> {
        let row = sqlx::query_as::<_, DbAssessment>(
            r#"SELECT id, farmer_id, location, land_size, soil_type, soil_ph,
               water_source, previous_crop, organic_farming, budget,
               additional_info, recommendations, created_at
               FROM land_assessments WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AssessmentRecord::try_from).transpose()
    }
}
