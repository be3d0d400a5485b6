use std::sync::Arc;

use anyhow::Result;
use chrono::Datelike;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use order_harvest::cli::{Cli, Command};
use order_harvest::utils::logging;
use order_harvest::{App, BackfillOutcome, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);
    logging::log_startup(cli.command.name(), &config.storage_path);

    let app = Arc::new(if cli.command.needs_browser() {
        App::initialize(config).await?
    } else {
        App::offline(config)
    });

    match cli.command {
        Command::Discover { year } => {
            let year = year.unwrap_or_else(|| chrono::Local::now().year());
            let view = open_progress_view(&app).await?;
            let result = app.discover(year).await;
            close_progress_view(&app, view).await?;
            result?;
        }
        Command::Backfill => {
            let view = open_progress_view(&app).await?;
            let result = app.backfill().await;
            close_progress_view(&app, view).await?;
            if let BackfillOutcome::Halted { order_id, reason, .. } = result? {
                anyhow::bail!("订单 {} 解析失败: {}", order_id, reason);
            }
        }
        Command::ParseCurrent => {
            let result = app.parse_current().await?;
            let outcome = order_harvest::services::ExtractOutcome::from(result);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Export { output } => {
            let tsv = app.export(output.as_deref()).await?;
            if output.is_none() {
                println!("{}", tsv);
            }
        }
        Command::Status => {
            println!("{}", app.status().await?);
        }
        Command::PageKind => {
            let kind = app.classify_active_page().await?;
            println!("{}", kind.as_str());
        }
    }

    Ok(())
}

/// 流程运行期间，每收到一次刷新就打印一行进度
async fn open_progress_view(app: &Arc<App>) -> Result<JoinHandle<()>> {
    let mut refresh = app.watch_refresh().await?;
    let app = app.clone();
    Ok(tokio::spawn(async move {
        loop {
            match refresh.recv().await {
                Ok(()) | Err(RecvError::Lagged(_)) => match app.progress().await {
                    Ok(line) => info!("📈 {}", line),
                    Err(e) => warn!("读取进度失败: {}", e),
                },
                Err(RecvError::Closed) => break,
            }
        }
    }))
}

async fn close_progress_view(app: &App, view: JoinHandle<()>) -> Result<()> {
    view.abort();
    app.close_refresh_view().await
}
