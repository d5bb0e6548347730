//! 命令行参数定义
use std::path::PathBuf;
use clap::Parser;

use crate::config::{DEFAULT_RULES_URL, ScanConfig};

/// 批量识别网站技术栈，输出 URL -> 技术列表 JSON
#[derive(Debug, Parser)]
#[command(name = "wappscan", version, about)]
pub struct Cli {
    /// URL列表文件，每行一个URL，空行忽略
    pub input: PathBuf,

    /// 本地 wappalyzergo 指纹库文件（fingerprints_data.json），指定后不读缓存也不联网拉取
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// 远程指纹库地址
    #[arg(long, value_name = "URL", default_value = DEFAULT_RULES_URL)]
    pub rules_url: String,

    /// 远程拉取失败时重试使用的GitHub代理前缀（如 https://ghfast.top/），默认不使用
    #[arg(long, value_name = "URL")]
    pub gh_proxy: Option<String>,

    /// 指纹库缓存文件
    #[arg(long, value_name = "FILE", default_value = "wappalyzer_rules.mp")]
    pub cache: PathBuf,

    /// 忽略缓存，重新拉取远程指纹库
    #[arg(long)]
    pub refresh_rules: bool,

    /// 单个请求超时（秒），0 表示不限制
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout: u64,

    /// 校验目标站点TLS证书（默认不校验）
    #[arg(long)]
    pub strict_tls: bool,

    /// 并发扫描数，1 为按输入顺序串行
    #[arg(short = 'c', long, value_name = "N", default_value_t = 1)]
    pub concurrency: usize,

    /// 自定义 User-Agent
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 将命令行参数映射为扫描配置
    pub fn to_config(&self) -> ScanConfig {
        let mut builder = ScanConfig::builder()
            .rules_path(self.rules.clone())
            .rules_url(self.rules_url.clone())
            .gh_proxy_url(self.gh_proxy.clone().unwrap_or_default())
            .rule_cache_path(self.cache.clone())
            .refresh_rules(self.refresh_rules)
            .http_timeout(self.timeout)
            .strict_tls(self.strict_tls)
            .concurrency(self.concurrency)
            .verbose(self.verbose);

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn input_is_required() {
        let err = Cli::try_parse_from(["wappscan"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn defaults_map_to_default_config() {
        let cli = Cli::try_parse_from(["wappscan", "urls.txt"]).unwrap();
        let config = cli.to_config();
        let defaults = ScanConfig::default();

        assert_eq!(cli.input, PathBuf::from("urls.txt"));
        assert_eq!(config.http_timeout, defaults.http_timeout);
        assert_eq!(config.rules_url, defaults.rules_url);
        assert_eq!(config.rule_cache_path, defaults.rule_cache_path);
        assert_eq!(config.user_agent, defaults.user_agent);
        assert!(config.gh_proxy_url.is_empty());
        assert!(!config.strict_tls);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "wappscan", "--strict-tls", "--timeout", "3", "-c", "0",
            "--rules", "fp.json", "--user-agent", "scanner/1.0", "--gh-proxy", "https://ghfast.top/",
            "-v", "urls.txt",
        ])
        .unwrap();
        let config = cli.to_config();

        assert!(config.strict_tls);
        assert_eq!(config.http_timeout, 3);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.rules_path, Some(PathBuf::from("fp.json")));
        assert_eq!(config.user_agent, "scanner/1.0");
        assert_eq!(config.gh_proxy_url, "https://ghfast.top/");
        assert!(config.verbose);
    }
}
