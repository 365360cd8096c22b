use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use zhiping::utils::logging;
use zhiping::{App, Command, Config};

/// 智评客户端
#[derive(Debug, Parser)]
#[command(name = "zhiping", version)]
struct Cli {
    /// TOML 配置文件，不指定时从环境变量读取
    #[arg(long, env = "ZHIPING_CONFIG")]
    config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::from_env(),
    };
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    let app = App::initialize(config)?;

    // Ctrl-C 只关闭本地会话，服务器上的批改继续进行
    let guard = app.guard();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，离开不会中止服务器上的批改");
            guard.close();
        }
    });

    app.run(cli.command).await?;

    Ok(())
}
