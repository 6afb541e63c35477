use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod ai;
mod config;
mod content;
mod controllers;
mod db;
mod keywords;
mod models;
mod storage;
mod verify;
mod workflow;

use config::Config;
use content::JobRegistry;
use storage::DataStorage;

pub struct AppState {
    pub storage: Arc<DataStorage>,
    pub config: Config,
    pub jobs: Arc<JobRegistry>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing storage ({})", config.storage_backend);
    let storage = Arc::new(DataStorage::from_config(&config).expect("Failed to initialize storage"));
    let jobs = Arc::new(JobRegistry::new());

    log::info!("Starting GEO backend on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                storage: Arc::clone(&storage),
                config: config.clone(),
                jobs: Arc::clone(&jobs),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::settings::config)
            .configure(controllers::keywords::config)
            .configure(controllers::content::config)
            .configure(controllers::optimize::config)
            .configure(controllers::verify::config)
            .configure(controllers::workflows::config)
            .configure(controllers::accounts::config)
            .configure(controllers::reports::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
