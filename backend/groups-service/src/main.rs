use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use crypto_core::JwtCodec;
use grpc_jwt_propagation::JwtServerInterceptor;
use std::sync::Arc;
use tokio::task::JoinSet;
use tonic::transport::Server;
use tracing::{error, info};

use groups_service::config::{Config, SERVICE_NAME};
use groups_service::grpc::groups::group_service_server::GroupServiceServer;
use groups_service::grpc::GroupServiceImpl;
use groups_service::repository::{PgGroupPostRepository, PgGroupRepository, PgMemberRepository};
use groups_service::services::GroupService;

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "groups_service=info,info".into());

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

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting {}", SERVICE_NAME);

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: env={}, http_port={}, grpc_port={}",
        config.app.env, config.app.http_port, config.grpc.port
    );

    let pg_pool = db_pool::create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let codec = JwtCodec::new(&config.jwt.secret).context("Failed to initialize JWT codec")?;

    let service = Arc::new(GroupService::new(
        Arc::new(PgGroupRepository::new(pg_pool.clone())),
        Arc::new(PgMemberRepository::new(pg_pool.clone())),
        Arc::new(PgGroupPostRepository::new(pg_pool.clone())),
    ));

    let grpc_addr = format!("{}:{}", config.app.host, config.grpc.port)
        .parse()
        .context("Invalid gRPC address")?;
    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);

    info!("HTTP health checks: http://{}", http_addr);
    info!("gRPC service: grpc://{}", grpc_addr);

    let mut join_set = JoinSet::new();

    let http_server = HttpServer::new(|| {
        App::new()
            .route("/health", web::get().to(|| async { "OK" }))
            .route("/ready", web::get().to(|| async { "READY" }))
    })
    .bind(&http_addr)
    .context("Failed to bind HTTP server")?
    .run();

    join_set.spawn(async move {
        http_server
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))
    });

    let grpc_service = GroupServiceImpl::new(service);
    let interceptor = JwtServerInterceptor::new(codec);

    join_set.spawn(async move {
        let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
        health_reporter
            .set_serving::<GroupServiceServer<GroupServiceImpl>>()
            .await;

        Server::builder()
            .add_service(health_service)
            .add_service(GroupServiceServer::with_interceptor(grpc_service, interceptor))
            .serve_with_shutdown(grpc_addr, shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("gRPC server error: {}", e))
    });

    info!("{} is running", SERVICE_NAME);

    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(Ok(())) => info!("Task completed successfully"),
            Ok(Err(e)) => {
                error!("Task failed: {:#}", e);
                return Err(e);
            }
            Err(e) => {
                error!("Task panicked: {:#}", e);
                return Err(anyhow::anyhow!("Task panicked: {}", e));
            }
        }
    }

    info!("{} shutting down", SERVICE_NAME);
    Ok(())
}
