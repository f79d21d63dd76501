#[macro_use]
extern crate log;
extern crate pretty_env_logger;

use actix_web::HttpServer;
use campus_meals::config::AppConfig;
use campus_meals::db::{establish_connection_pool, run_db_migrations};
use campus_meals::services::expiry_sweeper::run_expiry_sweeper;
use campus_meals::{build_app, AppState};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = dotenv() {
        eprintln!("Failed to load .env file: {}", e);
    }

    // Setup logging
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    info!("Initializing database connection pool...");
    let pool = establish_connection_pool(&config.database_url)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    run_db_migrations(pool.clone()).map_err(std::io::Error::other)?;

    let state = AppState::new(pool, config);

    if state.config.sweeper_interval_secs > 0 {
        info!(
            "Starting expiry sweeper every {}s",
            state.config.sweeper_interval_secs
        );
        actix_web::rt::spawn(run_expiry_sweeper(
            state.food_ops.clone(),
            state.claim_ops.clone(),
            state.donation_ops.clone(),
            state.config.sweeper_interval_secs,
        ));
    }

    let host = state.config.host.clone();
    let port = state.config.port;
    info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || build_app(&state))
        .bind((host, port))?
        .run()
        .await
}
