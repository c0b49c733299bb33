mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod state;
mod utils;
#[cfg(test)]
mod test_utils;

use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use services::image_store::LocalImageStore;
use state::AppState;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,md_creations=debug,sqlx=warn".into());

    if std::env::var("LOG_FORMAT").unwrap_or_default() == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(false).compact())
            .init();
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = Config::from_env().map_err(io::Error::other)?;

    tracing::info!("Connecting to database...");
    let db = db::establish_connection(&config.database_url)
        .await
        .map_err(io::Error::other)?;
    db::init_schema(&db).await.map_err(io::Error::other)?;
    if db::seed_admin(&db, config.admin_seed.as_ref()).await.map_err(io::Error::other)? {
        tracing::info!("Admin account created");
    }
    tracing::info!("Database ready");

    let images = LocalImageStore::new(&config.upload_folder)?;
    let server_addr = (config.server_host.clone(), config.server_port);

    let state = web::Data::new(AppState {
        db,
        config,
        images: Arc::new(images),
    });

    tracing::info!("Starting server on http://{}:{}", server_addr.0, server_addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(routes::configure_routes)
    })
    .bind(server_addr)?
    .run()
    .await
}
