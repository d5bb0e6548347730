use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, error::ErrorKind};
use tracing::{error, info};

use wappscan::{
    AggregateReport, Cli, Reporter, Scanner, UrlSource, aggregate, build_http_client, init_engine,
    init_logging,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            println!("{}", Cli::command().render_usage());
            return ExitCode::from(1);
        }
        Err(e) => e.exit(),
    };

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("致命错误：{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.to_config();

    // 输入文件不可读时直接退出，不加载规则也不发起任何请求
    let urls = UrlSource::load(&cli.input).await.context("读取URL列表失败")?;
    info!("读取到{}个目标URL", urls.len());

    let report = if urls.is_empty() {
        AggregateReport::new()
    } else {
        let engine = init_engine(&config).await.context("指纹引擎初始化失败")?;
        let client = build_http_client(&config).context("HTTP客户端构建失败")?;
        let scanner = Scanner::new(client, Arc::new(engine)).with_concurrency(config.concurrency);
        aggregate(scanner.scan_all(&urls).await)
    };

    Reporter::stdout().emit(&report).context("输出报告失败")?;
    Ok(())
}
