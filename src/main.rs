mod api;
mod cli;
mod config;
mod controller;
mod core;
mod download;
mod feed;
mod page;
mod session;
#[cfg(test)]
mod testing;

use api::{http_backend::HttpBackend, traits::ViewerBackend};
use cli::{Command, HELP};
use config::ViewerConfig;
use controller::PageController;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_appender::rolling;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = ViewerConfig::from_env()?;
    let backend = HttpBackend::from_config(&config)?;

    let args: Vec<String> = std::env::args().collect();
    if let Some(camera_url) = cli::probe_target(&args)? {
        let probe = backend.probe(camera_url).await?;
        println!("{}", serde_json::to_string_pretty(&probe.body())?);
        return Ok(());
    }

    tokio::fs::create_dir_all(&config.log_dir).await?;
    let file_appender = rolling::daily(&config.log_dir, "crowdcam-viewer.log");
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("crowdcam viewer using server {}", config.server_url);
    let controller = PageController::new(config, backend);
    controller.test_server_connection().await;
    println!("{}", controller.render_text().await);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Open(url) => {
                if let Err(err) = controller.open_camera(&url).await {
                    warn!("open camera: {err}");
                }
            }
            Command::Poll(url) => controller.start_snapshot_polling(&url).await,
            Command::Pause => {
                if !controller.stop_snapshot_polling().await {
                    println!("no feed running");
                }
            }
            Command::Capture => match controller.capture_snapshot().await {
                Ok(path) => println!("saved {}", path.display()),
                Err(err) => warn!("capture: {err}"),
            },
            Command::Analyze => {
                if let Err(err) = controller.analyze_crowd().await {
                    warn!("analyze: {err}");
                }
            }
            Command::Stop => controller.close_camera().await,
            Command::Status => {
                controller.test_server_connection().await;
                let view = controller.view().await;
                println!(
                    "feed running: {} | frames loaded: {}",
                    controller.feed_running().await,
                    view.frames_loaded
                );
            }
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Quit => break,
            Command::Unknown(input) => {
                println!("unknown command: {input}\n{HELP}");
                continue;
            }
        }
        println!("{}", controller.render_text().await);
    }

    controller.close_camera().await;
    info!("crowdcam viewer exiting");
    Ok(())
}
