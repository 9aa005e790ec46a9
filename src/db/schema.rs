//! SQL DDL for the advisory store.
//!
//! Both dialects create the same four tables. Measurements are stored as
//! floating point and `recommendations` as opaque JSON text.

/// SQLite schema, used for local runs and tests.
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS farmers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    location TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS crops (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    farmer_id INTEGER NOT NULL REFERENCES farmers(id) ON DELETE CASCADE,
    crop_name TEXT NOT NULL,
    planting_date TEXT NOT NULL,
    expected_harvest_date TEXT NOT NULL,
    soil_ph REAL NULL,
    variety TEXT NULL,
    field_size REAL NULL,
    irrigation_type TEXT NULL,
    previous_crop TEXT NULL,
    fertilizers_used TEXT NULL,
    additional_notes TEXT NULL,
    tips TEXT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS land_assessments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    farmer_id INTEGER NOT NULL REFERENCES farmers(id) ON DELETE CASCADE,
    location TEXT NOT NULL,
    land_size REAL NOT NULL,
    soil_type TEXT NOT NULL,
    soil_ph REAL NULL,
    water_source TEXT NULL,
    previous_crop TEXT NULL,
    organic_farming INTEGER NOT NULL DEFAULT 0,
    budget REAL NULL,
    additional_info TEXT NULL,
    recommendations TEXT NOT NULL, -- JSON, serialized as text
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_land_assessments_farmer ON land_assessments(farmer_id, created_at);

CREATE TABLE IF NOT EXISTS profit_analysis (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    crop_id INTEGER NOT NULL REFERENCES crops(id) ON DELETE CASCADE,
    cost_of_planting REAL NOT NULL,
    sale_price REAL NOT NULL,
    yield REAL NOT NULL,
    profit REAL NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// MySQL schema, used in production and by the `migrate` binary.
pub const MYSQL_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS farmers (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    username VARCHAR(255) UNIQUE NOT NULL,
    password VARCHAR(255) NOT NULL,
    location VARCHAR(255) NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS crops (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    farmer_id BIGINT NOT NULL,
    crop_name VARCHAR(255) NOT NULL,
    planting_date DATE NOT NULL,
    expected_harvest_date DATE NOT NULL,
    soil_ph DOUBLE,
    variety VARCHAR(255),
    field_size DOUBLE,
    irrigation_type VARCHAR(100),
    previous_crop VARCHAR(255),
    fertilizers_used TEXT,
    additional_notes TEXT,
    tips TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (farmer_id) REFERENCES farmers(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS land_assessments (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    farmer_id BIGINT NOT NULL,
    location VARCHAR(255) NOT NULL,
    land_size DOUBLE NOT NULL,
    soil_type VARCHAR(100) NOT NULL,
    soil_ph DOUBLE,
    water_source VARCHAR(100),
    previous_crop VARCHAR(255),
    organic_farming BOOLEAN NOT NULL DEFAULT FALSE,
    budget DOUBLE,
    additional_info TEXT,
    recommendations LONGTEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    INDEX idx_land_assessments_farmer (farmer_id, created_at),
    FOREIGN KEY (farmer_id) REFERENCES farmers(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS profit_analysis (
    id BIGINT AUTO_INCREMENT PRIMARY KEY,
    crop_id BIGINT NOT NULL,
    cost_of_planting DOUBLE NOT NULL,
    sale_price DOUBLE NOT NULL,
    yield DOUBLE NOT NULL,
    profit DOUBLE NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (crop_id) REFERENCES crops(id) ON DELETE CASCADE
)
"#;

/// Split a bundled DDL script into individual statements; sqlx executes one
/// statement per query.
pub fn statements(script: &str) -> impl Iterator<Item = &str> {
    script
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
