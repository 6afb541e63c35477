use std::env;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// "sqlite" (default) or "json"
    pub storage_backend: String,
    /// Directory for the JSON backend's entity files
    pub data_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "./.db/geo.db".to_string()),
            storage_backend: env::var("STORAGE_BACKEND").unwrap_or_else(|_| "sqlite".to_string()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "./.data".to_string()),
        }
    }
}
