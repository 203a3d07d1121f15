mod api;
mod config;
mod error;
mod model;
mod repository;
mod service;
mod util;

use anyhow::Result;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[tokio::main]
async fn main() -> Result<()> {
    // 创建日志目录
    let log_dir = PathBuf::from("logs");
    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)?;
    }

    // 日志文件按日期滚动
    let file_appender = tracing_appender::rolling::daily(&log_dir, "task_srv.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // 控制台输出层（带颜色）
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_filter(filter.clone());

    // 文件输出层（无颜色）
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    // 加载配置
    let config = config::AppConfig::load("config.toml")?;

    // 初始化数据库
    let pool = repository::database::init_db(&config).await?;

    // 构建应用状态和路由
    let bind_addr = config.bind_addr();
    let app_state = api::AppState::new(config, pool);
    let app = api::routes::create_router(app_state);

    // 启动服务器
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
