use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use estimator::catalog::Catalog;
use estimator::cli::{Cli, Commands, DEMO_DESCRIPTION, DEMO_WORKERS};
use estimator::config::Config;
use estimator::estimation::estimator::{assess, estimate, JobRequest};
use estimator::images::read_image;
use estimator::llm_client::{self, LlmClient};
use estimator::routes::build_router;
use estimator::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting estimator v{}", env!("CARGO_PKG_VERSION"));

    let catalog_path = cli.catalog.clone().unwrap_or_else(|| config.catalog_path.clone());
    let catalog = Catalog::load(&catalog_path)?;

    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.llm_timeout,
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => {
            let request = JobRequest::new(DEMO_DESCRIPTION, catalog.tools.clone(), DEMO_WORKERS);
            let result = estimate(&request, &llm).await?;
            println!("Result: {}", serde_json::to_string(&result)?);
        }
        Commands::Estimate {
            description,
            images,
            workers,
            raw,
        } => {
            let images = images
                .iter()
                .map(|p| read_image(p.as_path()))
                .collect::<Result<Vec<_>>>()?;
            let request =
                JobRequest::new(description, catalog.tools.clone(), workers).with_images(images);
            let assessment = assess(&request, &llm).await?;
            if raw {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&assessment.result)?);
            }
        }
        Commands::Serve { port } => {
            serve(
                catalog,
                llm,
                port.unwrap_or(config.port),
                config.max_body_bytes,
                &catalog_path,
            )
            .await?;
        }
    }

    Ok(())
}

async fn serve(
    catalog: Catalog,
    llm: LlmClient,
    port: u16,
    max_body_bytes: usize,
    catalog_path: &Path,
) -> Result<()> {
    let state = AppState {
        backend: Arc::new(llm),
        catalog: Arc::new(catalog),
        max_body_bytes,
    };
    info!("Serving catalog from {}", catalog_path.display());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
