//! rankflow daemon entrypoint
//!
//! Diagnostics go to stderr so the sample stream on stdout stays clean for
//! redirection. Configuration comes from the environment (see `config`).

use dotenv::dotenv;
use log::{error, info};
use rankflow::api::HttpSourceApi;
use rankflow::config::{Config, Mode};
use rankflow::scheduler::Scheduler;
use rankflow::sink::TsvSink;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Logs to stderr; stdout is reserved for the sample stream
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            return Err(e.into());
        }
    };

    info!("🚀 Starting rankflow...");
    info!("📊 Configuration:");
    info!("   ├─ Mode: {}", config.mode);
    info!("   ├─ Sample interval: {}s", config.sample_interval_secs);
    info!("   ├─ Rank categories: {}", config.categories.join(", "));
    if config.mode == Mode::Discovery {
        info!("   ├─ Discovery category: {}", config.discovery_category);
        info!("   ├─ Follow items: {}h", config.max_age_hours);
    }
    info!("   ├─ Max rank depth: {}", config.max_rank);
    info!("   ├─ Concurrent fetches: {}", config.max_concurrent_fetches);
    info!("   ├─ API base: {}", config.api_base);
    info!(
        "   └─ Output: {}",
        config.output_path.as_deref().unwrap_or("stdout")
    );

    let api = Arc::new(HttpSourceApi::new(&config.api_base, config.fetch_timeout_secs)?);
    let sink = TsvSink::from_config(
        config.output_path.as_deref(),
        config.mode,
        &config.categories,
    )?;
    let mut scheduler = Scheduler::new(api, config, sink);

    info!("✅ Sampler running, press CTRL+C to stop");

    tokio::select! {
        _ = scheduler.run() => {}
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("⚠️  Received CTRL+C, shutting down..."),
                Err(err) => error!("❌ Failed to listen for CTRL+C: {}", err),
            }
        }
    }

    info!("✅ rankflow stopped");
    Ok(())
}
