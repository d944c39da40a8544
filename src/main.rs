use chatroom::{config::Config, db, router, sweeper, AppState};
use time::UtcOffset;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // must precede the runtime's worker threads
    let offset = db::init_local_offset();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(offset))
}

async fn run(offset: UtcOffset) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatroom=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    info!(
        bind_address = %config.bind_address,
        sweeper = ?config.sweeper,
        clock_offset = %offset,
        "Configuration loaded"
    );

    let db_pool = db::connect(&config.database_url)
        .await
        .inspect_err(|e| error!("Failed to open database: {e}"))?;

    let cancel_token = CancellationToken::new();
    let sweeper = tokio::spawn(sweeper::start_sweeper(
        db_pool.clone(),
        config.sweeper.clone(),
        cancel_token.clone(),
    ));

    let app = router(AppState { db_pool });
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel_token.cancel();
    sweeper.await?;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}
