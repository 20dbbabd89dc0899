use anyhow::Context;
use clap::Parser;
use shipment_times::server::{self, AppState};
use shipment_times::utils::{logger, validation::Validate};
use shipment_times::TomlConfig;

#[derive(Parser)]
#[command(name = "serve")]
#[command(about = "Upload server for BASE order exports")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the listen address from config
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_server_logger();

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path))?
        }
        None => TomlConfig::default(),
    };

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    config.validate().context("invalid configuration")?;
    let addr = config.bind_addr()?;

    let state = AppState::new(config.shipment_config());
    let app = server::router(state, config.server.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(
        "🚀 Listening on http://{} (output: {})",
        addr,
        config.output.dir
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
