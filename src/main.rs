use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use thumbwell::application::{BrowseItemsUseCase, ImageCache};
use thumbwell::infrastructure::{AppConfig, CliArgs, Command, ConfigStorage, HttpCatalogClient};
use thumbwell::presentation::{render_categories, render_rows};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = ConfigStorage::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = thumbwell::VERSION, "Starting {}", thumbwell::NAME);

    let images = ImageCache::open(&config.cache)
        .await
        .wrap_err("failed to open image cache")?;

    if args.command() == Command::Clear {
        images.clear().await;
        println!("Image cache cleared.");
        return Ok(());
    }

    let timeout = Duration::from_secs(config.cache.request_timeout_secs);
    let catalog = Arc::new(HttpCatalogClient::new(timeout)?);
    let browse = BrowseItemsUseCase::new(catalog, images.clone());

    match args.command() {
        Command::Categories => {
            let categories = browse
                .categories(&config.endpoint)
                .await
                .wrap_err_with(|| format!("error from endpoint {}", config.endpoint))?;
            print!("{}", render_categories(&categories));
        }
        Command::List { category } => {
            let rows = browse
                .execute(&config.endpoint, category.as_deref(), config.image_variant)
                .await
                .wrap_err_with(|| format!("error from endpoint {}", config.endpoint))?;
            print!("{}", render_rows(&rows));
            debug!(stats = %images.stats(), "Image cache statistics");
        }
        Command::Clear => {}
    }

    Ok(())
}
