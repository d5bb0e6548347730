//! 日志初始化：统一输出到标准错误，标准输出只留给JSON报告

use tracing_subscriber::EnvFilter;

/// 报告模块的 info 日志始终开启，保证日志中也有一份完整报告
const REPORT_DIRECTIVE: &str = "wappscan::report=info";

/// 默认过滤级别（未设置 RUST_LOG 时生效）
fn default_filter(verbose: bool) -> &'static str {
    if verbose { "info,wappscan=debug" } else { "info" }
}

/// 构建过滤器：`RUST_LOG` 非空且合法时优先，报告日志不受其级别影响
pub(crate) fn build_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let filter = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter(verbose)));

    match REPORT_DIRECTIVE.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// 初始化日志；重复初始化时静默忽略
pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
