//! Pixel demo — replays a storefront checkout against an in-memory page.
//!
//! The shopper adds each sample product to the cart, starts checkout and
//! confirms the purchase. The vendor script "downloads" after a configurable
//! latency, so early calls sit in the command buffer until it arrives.

mod catalog;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use pixel_core::{AppConfig, PurchaseEvent, TrackingEvent};
use pixel_web_sdk::{InMemoryDocument, RecordingEndpoint, ScriptLoader, TrackingAdapter};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "pixel-demo")]
#[command(about = "Replay a storefront checkout through the pixel tracking adapter")]
#[command(version)]
struct Cli {
    /// Vendor pixel id (overrides config)
    #[arg(long, env = "PIXEL_DEMO__PIXEL__PIXEL_ID")]
    pixel_id: Option<String>,

    /// Enable the vendor's debug mode
    #[arg(long, default_value_t = false)]
    test_mode: bool,

    /// Simulated download time of the vendor script
    #[arg(long, default_value_t = 250)]
    script_latency_ms: u64,

    /// Simulated order processing time before the purchase is confirmed
    #[arg(long, default_value_t = 2000)]
    processing_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixel_demo=info,pixel_web_sdk=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(pixel_id) = cli.pixel_id {
        config.pixel.pixel_id = pixel_id;
    }
    if cli.test_mode {
        config.pixel.test_mode = true;
    }

    info!(
        pixel_id = %config.pixel.pixel_id,
        test_mode = config.pixel.test_mode,
        max_attempts = config.readiness.max_attempts,
        poll_interval_ms = config.readiness.poll_interval_ms,
        "Configuration loaded"
    );

    let document = Arc::new(InMemoryDocument::new());
    let loader = Arc::new(ScriptLoader::new(document.clone(), config.loader.clone()));
    let endpoint = Arc::new(RecordingEndpoint::new());
    let adapter = Arc::new(TrackingAdapter::from_config(&config, loader.clone())?);

    // The browser fetches the vendor script on its own schedule.
    let script_download = {
        let loader = loader.clone();
        let endpoint = endpoint.clone();
        let latency = Duration::from_millis(cli.script_latency_ms);
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            match loader.script_loaded(endpoint) {
                Ok(replayed) => info!(replayed, "vendor script loaded"),
                Err(e) => error!(error = %e, "vendor script never attached"),
            }
        })
    };

    let outcome = adapter.spawn_initialize().outcome().await;
    info!(initialized = outcome.initialized, "pixel status");

    let products = catalog::sample_products();
    for product in &products {
        match TrackingEvent::from_product(product) {
            Ok(event) => {
                adapter.track_add_to_cart(&event);
                info!(product = %product.name, "added to cart");
            }
            Err(e) => error!(product = %product.id, error = %e, "add to cart not tracked"),
        }
    }

    match TrackingEvent::from_cart(&products) {
        Ok(checkout) => {
            adapter.track_initiate_checkout(&checkout);
            info!(total = %checkout.value, "checkout started");
        }
        Err(e) => error!(error = %e, "checkout not tracked"),
    }

    tokio::time::sleep(Duration::from_millis(cli.processing_ms)).await;

    let order_id = PurchaseEvent::generate_order_id();
    match PurchaseEvent::from_cart(order_id, &products) {
        Ok(purchase) => {
            adapter.track_purchase(&purchase);
            info!(
                order_id = %purchase.order_id,
                total = %purchase.total_amount,
                "purchase completed"
            );
        }
        Err(e) => error!(error = %e, "purchase not tracked"),
    }

    script_download.await?;

    let state = adapter.state();
    info!(
        script_injected = state.script_injected,
        ready = state.ready,
        scripts = document.script_count(),
        vendor_calls = endpoint.count(),
        "demo finished"
    );

    println!("{}", serde_json::to_string_pretty(&endpoint.executed())?);

    Ok(())
}
