use clap::Parser;
use mnemos_core::MnemosConfig;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use mnemos_server::{server, Services};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "mnemos.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience; production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config
    let config = match MnemosConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Init logging: RUST_LOG wins, the config's log_level is the fallback
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    // Connect collaborators
    let services = match Services::connect(config.clone()).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to connect to graph store: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match services.store.version().await {
            Ok(v) => println!("✅ Graph store connected: {} {}", services.store.name(), v),
            Err(e) => {
                println!("❌ Graph store check failed: {}", e);
                std::process::exit(1);
            }
        }

        println!("✅ Mnemos health check passed");
        return Ok(());
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    // HTTP REST API for the web UI
    let http_task = if config.http.enabled {
        let http_services = services.clone();
        let http_shutdown = tx.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = mnemos_server::http::start_http_server(http_services, http_shutdown).await {
                tracing::error!("HTTP server error: {}", e);
            }
        }))
    } else {
        None
    };

    let socket_path = config.service.socket_path.clone();
    let ipc_result = server::run_unix_server(&socket_path, services, tx.subscribe()).await;

    // Stop the HTTP server too if the IPC loop ended on its own.
    let _ = tx.send(());
    if let Some(task) = http_task {
        if let Err(e) = task.await {
            tracing::error!("HTTP server task failed: {}", e);
        }
    }

    ipc_result?;

    tracing::info!("Mnemos stopped");
    Ok(())
}
