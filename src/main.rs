mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;
mod utils;
#[cfg(test)]
mod test_utils;

use actix_web::{App, HttpServer, middleware::Logger, web};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::AppError;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attendance_tracker=info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("connecting to database");
    let db = db::establish_connection(&config.database_url).await?;
    db::create_schema(&db).await?;
    tracing::info!("database ready");

    let bind = (config.host.clone(), config.port);
    tracing::info!(host = %bind.0, port = bind.1, "starting attendance tracker");

    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .configure(routes::configure_routes)
    })
        .bind(bind)?
        .run()
        .await?;

    Ok(())
}
