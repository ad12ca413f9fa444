use dompet::Config;
use dompet::bootstrap::Services;
use dompet::config::TransportMode;
use dompet::error::ConfigError;
use dompet::telegram::{WebhookState, run_polling, webhook_router};
use mimalloc::MiMalloc;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::{net::TcpListener, signal, sync::watch};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        build = option_env!("DOMPET_BUILD_TAG").unwrap_or("dev"),
        version = env!("CARGO_PKG_VERSION"),
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        storage = ?cfg.storage.backend,
        bot_token_len = cfg.telegram.bot_token.len(),
        credentials_len = cfg.storage.credentials_base64.len(),
        "Starting dompet"
    );

    let services = Services::build(&cfg).await?;
    let Services {
        scheduler,
        telegram,
        dispatcher,
    } = services;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        let _ = signal_tx.send(true);
    });

    let grace = Duration::from_secs(cfg.basic.shutdown_grace_secs);
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx.clone(), grace));

    match cfg.telegram.mode {
        TransportMode::Polling => {
            run_polling(
                telegram,
                dispatcher,
                cfg.telegram.poll_timeout_secs,
                shutdown_rx.clone(),
            )
            .await?;
        }
        TransportMode::Webhook => {
            let webhook_url = cfg
                .telegram
                .webhook_url
                .as_ref()
                .ok_or(ConfigError::Missing("telegram.webhook_url"))?;
            telegram
                .set_webhook(webhook_url, cfg.telegram.webhook_secret.as_deref())
                .await?;
            info!(url = %webhook_url, "Webhook registered");

            let state = WebhookState::new(dispatcher, cfg.telegram.webhook_secret.as_deref());
            let app = webhook_router(state);

            let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
            let listener = TcpListener::bind(addr).await?;
            info!("HTTP server listening on {}", addr);
            let mut server_rx = shutdown_rx.clone();
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = server_rx.wait_for(|stop| *stop).await;
                })
                .await?;
            info!("Server has shut down gracefully.");
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_task.await {
        warn!(error = %e, "Reminder scheduler task ended abnormally");
    }
    info!("Bye.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
