use std::io;
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;

use cosmodeck::app::{cors, AppState};
use cosmodeck::auth::{AuthMiddleware, TokenKeys};
use cosmodeck::config::Config;
use cosmodeck::routes::{self, health};
use cosmodeck::store::PgStore;

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    log::error!("Startup failed: {}", err);
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(startup_error)?;
    let store = Arc::new(PgStore::new(pool));
    store.migrate().await.map_err(startup_error)?;

    let state = AppState::new(store, TokenKeys::new(&config.jwt_secret), config.bcrypt_cost);
    let frontend_url = config.frontend_url.clone();

    log::info!("Starting CosmoDeck server at {}", config.server_url());
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .configure(|cfg| state.configure(cfg))
            .wrap(cors(frontend_url.as_deref()))
            .wrap(Logger::default())
            .service(health::health)
            .service(health::index)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
