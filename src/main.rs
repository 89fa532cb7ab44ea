use anyhow::{bail, Context};
use car_inspector::analyzer::DetectionClient;
use car_inspector::cli::{Cli, Commands};
use car_inspector::config::Config;
use car_inspector::health::HealthMonitor;
use car_inspector::report;
use car_inspector::session::SessionController;
use car_inspector::upload::{MemoryPreviewStore, RawFile, UploadPipeline};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "car_inspector=debug"
    } else {
        "car_inspector=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
        config.validate()?;
    }

    match cli.command {
        Commands::Analyze { file, json, save_visualization } => {
            let client = DetectionClient::new(&config)?;
            let raw = RawFile::from_path(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;

            let store = Arc::new(MemoryPreviewStore::new());
            let mut session = SessionController::new(UploadPipeline::new(store));

            // 1. アップロード
            if let Err(e) = session.submit_file(raw) {
                bail!("{}", e);
            }

            // 2. 解析
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner());
            spinner.set_message("Анализ изображения...");
            spinner.enable_steady_tick(Duration::from_millis(120));
            session.run_analysis(&client).await;
            spinner.finish_and_clear();

            // 3. レポート出力
            let state = session.state();
            if let Some(error) = &state.error {
                bail!("{}", error);
            }
            let (Some(upload), Some(result)) = (&state.uploaded_file, &state.result) else {
                bail!("analysis produced no result");
            };

            if json {
                println!("{}", serde_json::to_string_pretty(result.as_ref())?);
            } else {
                print!("{}", report::render_report(upload, result));
            }

            if let Some(path) = save_visualization {
                match report::decode_visualization(result)? {
                    Some(bytes) => {
                        std::fs::write(&path, bytes)
                            .with_context(|| format!("failed to write {}", path.display()))?;
                        println!("✔ Визуализация сохранена: {}", path.display());
                    }
                    None => println!("Визуализация недоступна"),
                }
            }

            session.reset();
        }

        Commands::Health { watch } => {
            let monitor = Arc::new(HealthMonitor::new(DetectionClient::new(&config)?));

            if !watch {
                let status = monitor.refresh().await;
                print!("{}", report::render_health(&status));
                return Ok(());
            }

            let mut updates = monitor.subscribe();
            let poller = monitor.spawn_polling(config.health_poll_interval());
            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let status = updates.borrow_and_update().clone();
                        print!("{}", report::render_health(&status));
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            poller.abort();
        }

        Commands::ModelInfo => {
            let client = DetectionClient::new(&config)?;
            match client.model_info().await {
                Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
                None => println!("Информация о модели недоступна ({})", client.base_url()),
            }
        }

        Commands::Config { set_api_url, show } => {
            if let Some(url) = set_api_url {
                config.set_api_url(url)?;
                println!("✔ API URL: {}", config.api_url);
            }

            if show {
                println!("Settings:");
                println!("  API URL: {}", config.api_url);
                match config.request_timeout() {
                    Some(t) => println!("  Request timeout: {}s", t.as_secs()),
                    None => println!("  Request timeout: none"),
                }
                println!("  Health poll interval: {}s", config.health_poll_interval().as_secs());
                println!(
                    "  Offline fallback delay: {}-{} ms",
                    config.fallback_delay_min_ms, config.fallback_delay_max_ms
                );
            }
        }
    }

    Ok(())
}
