use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use taskhive::{auth::AuthMiddleware, auth::JwtKeys, config::Config, email::MailgunClient, routes};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connection_count)
        .min_connections(config.min_connection_count)
        .connect(&config.database_url)
        .await
        .map_err(|e| startup_error("Failed to connect to database", e))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;

    let mailer = MailgunClient::new(&config)
        .map_err(|e| startup_error("Failed to build email client", e))?;

    let pool = web::Data::new(pool);
    let keys = web::Data::new(JwtKeys::new(&config.jwt_secret));
    let mailer = web::Data::new(mailer);
    let bind_address = (config.server_host.clone(), config.server_port);
    log::info!("Starting taskhive server at {}", config.server_url());
    let config = web::Data::new(config);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(pool.clone())
            .app_data(keys.clone())
            .app_data(mailer.clone())
            .app_data(config.clone())
            .wrap(AuthMiddleware)
            .wrap(cors)
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind(bind_address)?
    .run()
    .await
}
