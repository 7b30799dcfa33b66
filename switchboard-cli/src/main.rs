use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use std::sync::Arc;
use switchboard::server::{
    AppState, AuditEmitter, AuditSink, Config, JsonLinesAuditSink, TracingAuditSink,
    build_router, mint_dev_token,
};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "switchboard")]
#[command(about = "Authenticated WebSocket signaling relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay.
    Serve {
        /// Overrides BIND_ADDRESS.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Sign an access token for local testing.
    DevToken {
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        secret: String,

        #[arg(long, default_value = "dev-user")]
        user_id: String,

        #[arg(long, default_value = "dev@example.com")]
        email: String,

        #[arg(long, default_value_t = 60)]
        ttl_minutes: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => serve(bind).await,
        Commands::DevToken {
            secret,
            user_id,
            email,
            ttl_minutes,
        } => {
            let token = mint_dev_token(
                &secret,
                &user_id,
                &email,
                chrono::Duration::minutes(ttl_minutes),
            )
            .context("Failed to sign dev token")?;
            eprintln!(
                "{} {} ({} min)",
                "Token for".cyan(),
                email.bold(),
                ttl_minutes
            );
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(bind: Option<String>) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchboard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(bind) = bind {
        config.bind_address = bind;
    }
    info!(config = ?config, "Configuration loaded");

    let sink: Arc<dyn AuditSink> = match &config.audit_log_path {
        Some(path) => {
            let sink = JsonLinesAuditSink::open(path)
                .await
                .with_context(|| format!("Failed to open audit log {}", path.display()))?;
            info!(path = %sink.path().display(), "Audit events go to JSON lines file");
            Arc::new(sink)
        }
        None => Arc::new(TracingAuditSink),
    };
    let (audit, _audit_task) = AuditEmitter::spawn(sink, config.audit_queue_capacity);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.bind_address))?;

    let app = build_router(AppState::start(config, audit));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    println!(
        "{} {}",
        "Signaling relay listening on".green().bold(),
        format!("ws://{}/ws", addr).cyan()
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Relay shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, shutting down"),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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
}
