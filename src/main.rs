//!**Main entry point for the Survey API server**
//!
//! This module is responsible for initializing the logging infrastructure,
//! connecting the data store selected by `DATA_STORE_URL`,
//! and launching the Actix web server with all registered routes.
//!
//! The server only starts after the store is reachable, so a bad
//! configuration fails at boot instead of on the first request.

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use survey_api::config::ServerConfig;
use survey_api::handlers;
use survey_api::logging;
use survey_api::store;
use tracing::{error, info};

/// Main asynchronous function to configure and start the backend server.
///
/// # Steps performed:
/// 1. Initialize structured logging with `tracing_subscriber`, respecting the RUST_LOG env var.
/// 2. Read `BIND` and `DATA_STORE_URL` from the environment.
/// 3. Build the survey store once; it is shared by every worker.
/// 4. Configure the Actix web server with middleware and route handlers.
/// 5. Bind the server and run.
///
/// # Errors
/// Returns an error if the configuration is invalid, the store cannot be
/// built, or the address cannot be bound.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    logging::init();

    info!("Starting Survey API server");

    let config = ServerConfig::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        std::io::Error::other(e)
    })?;

    let survey_store = store::connect(&config.data_store).await.map_err(|e| {
        error!(error = %e, "Failed to set up data store");
        std::io::Error::other(e)
    })?;
    let survey_store = web::Data::from(survey_store);

    info!(bind = %config.bind, "Listening");
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .wrap(logging::access_log())
            .app_data(survey_store.clone())
            .configure(handlers::configure)
    })
    .bind(config.bind.as_str())?
    .run()
    .await
}
