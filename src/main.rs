use anyhow::Context;
use clap::Parser;
use places_harvest::app::pipelines::plan_regions;
use places_harvest::core::store::ResultStore;
use places_harvest::utils::error::ErrorSeverity;
use places_harvest::utils::{logger, validation::Validate};
use places_harvest::{
    ChromeSession, CliConfig, HarvestConfig, HarvestEngine, HarvestError, HarvestPipeline,
    HarvestSummary, HttpRegionCatalog, LocalStorage,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting places-harvest");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if cli.dry_run {
        let regions = list_pending(&config).await.context("listing pending regions")?;
        for region in &regions {
            println!("{}", region);
        }
        tracing::info!("{} regions pending", regions.len());
        return Ok(());
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match harvest(config, cli.monitor).await {
        Ok(summary) => {
            tracing::info!("✅ Harvest completed successfully!");
            tracing::info!(
                "📁 {} regions, {} places, {} photos committed; store holds {} places",
                summary.regions_processed,
                summary.places_committed,
                summary.images_committed,
                summary.store_size
            );
            let report =
                serde_json::to_string_pretty(&summary).context("rendering run summary")?;
            println!("{}", report);
        }
        Err(e) => {
            tracing::error!(
                "❌ Harvest failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

/// Pending regions as a harvest would visit them, without a browser.
async fn list_pending(config: &HarvestConfig) -> Result<Vec<String>, HarvestError> {
    let catalog = HttpRegionCatalog::new(config.source.regions_url.clone());
    let store = ResultStore::new(
        LocalStorage::new(config.output.data_dir.clone()),
        config.places_path(),
        config.region_log_path(),
    );
    plan_regions(&catalog, &store, &config.run).await
}

async fn harvest(config: HarvestConfig, monitor: bool) -> Result<HarvestSummary, HarvestError> {
    let session = ChromeSession::launch(&config.browser).await?;
    let surface = session
        .open_surface(config.locale.clone(), config.browser.home_url.clone())
        .await?;

    let storage = LocalStorage::new(config.output.data_dir.clone());
    let catalog = HttpRegionCatalog::new(config.source.regions_url.clone());
    let pipeline = HarvestPipeline::new(Arc::new(surface), storage, catalog, config);

    let engine = HarvestEngine::new_with_monitoring(pipeline, monitor);
    let outcome = engine.run().await;

    if let Err(e) = session.close().await {
        tracing::warn!("Browser did not shut down cleanly: {}", e);
    }
    outcome
}
