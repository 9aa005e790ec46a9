//! Runtime configuration.
//!
//! Sources, lowest priority first: built-in defaults, `config.toml`, the flat
//! environment variables used by existing deployments (`PORT`, `MYSQL_URL`,
//! `MYSQLHOST`, `GEMINI_API_KEY`, ...) and finally `ADVISOR_`-prefixed nested
//! variables such as `ADVISOR_GEMINI__MODEL`.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub basic: BasicConfig,
    pub database: DatabaseConfig,
    pub gemini: GeminiConfig,
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub port: u16,
    pub loglevel: String,
    pub proxy: Option<Url>,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            port: 5000,
            loglevel: "info".to_string(),
            proxy: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Internal connection string used by the running service.
    pub url: Option<String>,
    /// Externally reachable connection string used by the migration tool.
    pub public_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub connect_timeout_secs: u64,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            public_url: None,
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            name: "farm_advisor".to_string(),
            connect_timeout_secs: 60,
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPurpose {
    Serve,
    Migrate,
}

impl DatabaseConfig {
    /// Pick the connection string: the internal URL when serving, the public
    /// URL when migrating, otherwise one assembled from the discrete fields.
    pub fn connection_url(&self, purpose: ConnectionPurpose) -> Result<String, url::ParseError> {
        let preferred = match purpose {
            ConnectionPurpose::Serve => self.url.as_deref(),
            ConnectionPurpose::Migrate => self.public_url.as_deref(),
        };
        if let Some(url) = preferred.map(str::trim).filter(|u| !u.is_empty()) {
            return Ok(url.to_string());
        }

        let mut url = Url::parse(&format!("mysql://{}:{}/", self.host, self.port))?;
        url.set_path(&self.name);
        // Only fails for cannot-be-a-base URLs, which a mysql:// URL never is.
        let _ = url.set_username(&self.user);
        if !self.password.is_empty() {
            let _ = url.set_password(Some(&self.password));
        }
        Ok(url.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Url,
    pub timeout_secs: u64,
    /// Ask the model for `application/json` output.
    pub structured_output: bool,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            base_url: Url::parse("https://generativelanguage.googleapis.com/")
                .expect("static Gemini base url"),
            timeout_secs: 60,
            structured_output: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Without a key the service uses static demo weather.
    pub api_key: Option<String>,
    pub base_url: Url,
    pub forecast_days: u8,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Url::parse("https://api.weatherapi.com/").expect("static weather base url"),
            forecast_days: 7,
        }
    }
}

/// Lower-priority aliases kept for older `.env` files.
fn legacy_alias(key: &str) -> Option<&'static str> {
    match key {
        "DB_USER" => Some("database.user"),
        "DB_PASSWORD" => Some("database.password"),
        "DB_NAME" => Some("database.name"),
        _ => None,
    }
}

fn flat_env_key(key: &str) -> Option<&'static str> {
    match key {
        "PORT" => Some("basic.port"),
        "LOGLEVEL" => Some("basic.loglevel"),
        "PROXY" => Some("basic.proxy"),
        "DATABASE_URL" | "MYSQL_URL" => Some("database.url"),
        "MYSQL_PUBLIC_URL" => Some("database.public_url"),
        "MYSQLHOST" => Some("database.host"),
        "MYSQLPORT" => Some("database.port"),
        "MYSQLUSER" => Some("database.user"),
        "MYSQLPASSWORD" => Some("database.password"),
        "MYSQLDATABASE" => Some("database.name"),
        "GEMINI_API_KEY" => Some("gemini.api_key"),
        "WEATHER_API_KEY" => Some("weather.api_key"),
        _ => None,
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::raw().filter_map(|k| {
                legacy_alias(&k.as_str().to_ascii_uppercase()).map(Into::into)
            }))
            .merge(Env::raw().filter_map(|k| {
                flat_env_key(&k.as_str().to_ascii_uppercase()).map(Into::into)
            }))
            .merge(Env::prefixed("ADVISOR_").split("__"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}
