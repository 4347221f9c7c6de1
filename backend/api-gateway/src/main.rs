use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use crypto_core::JwtCodec;
use tracing::info;
use tracing_actix_web::TracingLogger;

use api_gateway::clients::ServiceClients;
use api_gateway::config::{Config, SERVICE_NAME};
use api_gateway::middleware::JwtAuth;
use api_gateway::rest_api;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "api_gateway=info,info".into());

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting {}", SERVICE_NAME);

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        users = %config.services.users,
        posts = %config.services.posts,
        groups = %config.services.groups,
        friends = %config.services.friends,
        "Backend endpoints configured"
    );

    let codec = JwtCodec::new(&config.jwt.secret).context("Failed to initialize JWT codec")?;
    let clients =
        ServiceClients::new(&config.services).context("Invalid backend service endpoint")?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("REST API listening on http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(JwtAuth::new(codec.clone()))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(clients.clone()))
            .route("/health", web::get().to(|| async { "OK" }))
            .configure(rest_api::configure)
    })
    .bind(&bind_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    info!("{} shutting down", SERVICE_NAME);
    Ok(())
}
