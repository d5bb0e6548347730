//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;
use std::time::Duration;

/// wappalyzergo 官方指纹库地址
pub const DEFAULT_RULES_URL: &str =
    "https://raw.githubusercontent.com/projectdiscovery/wappalyzergo/refs/heads/main/fingerprints_data.json";

/// 扫描配置
#[derive(Debug, Clone)]
pub struct ScanConfig {
    // 本地规则文件（wappalyzergo JSON），设置后不再读缓存、不再拉取远程
    pub rules_path: Option<PathBuf>,
    // 远程规则地址
    pub rules_url: String,
    // GitHub代理URL前缀（默认为空，不经第三方镜像重试）
    pub gh_proxy_url: String,
    // 规则缓存路径
    pub rule_cache_path: PathBuf,
    // 忽略缓存，强制拉取远程规则
    pub refresh_rules: bool,
    // 目标请求超时（单位：秒）
    pub http_timeout: u64,
    // 规则拉取超时（单位：秒）
    pub rule_timeout: u64,
    // 是否校验TLS证书（默认不校验，侦察场景下接受自签名/过期证书）
    pub strict_tls: bool,
    // 并发扫描数，1 表示按输入顺序串行
    pub concurrency: usize,
    // 请求 User-Agent
    pub user_agent: String,
    // 是否启用详细日志
    pub verbose: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            rules_url: DEFAULT_RULES_URL.to_string(),
            gh_proxy_url: String::new(),
            rule_cache_path: PathBuf::from("wappalyzer_rules.mp"),
            refresh_rules: false,
            http_timeout: 10,
            rule_timeout: 30,
            strict_tls: false,
            concurrency: 1,
            user_agent: concat!("wappscan/", env!("CARGO_PKG_VERSION")).to_string(),
            verbose: false,
        }
    }
}

impl ScanConfig {
    /// 自定义配置
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: ScanConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules_path(mut self, path: Option<PathBuf>) -> Self {
        self.config.rules_path = path;
        self
    }

    pub fn rules_url(mut self, url: String) -> Self {
        self.config.rules_url = url;
        self
    }

    pub fn gh_proxy_url(mut self, url: String) -> Self {
        self.config.gh_proxy_url = url;
        self
    }

    pub fn rule_cache_path(mut self, path: PathBuf) -> Self {
        self.config.rule_cache_path = path;
        self
    }

    pub fn refresh_rules(mut self, refresh: bool) -> Self {
        self.config.refresh_rules = refresh;
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn rule_timeout(mut self, timeout: u64) -> Self {
        self.config.rule_timeout = timeout;
        self
    }

    pub fn strict_tls(mut self, strict: bool) -> Self {
        self.config.strict_tls = strict;
        self
    }

    /// 并发数下限为1
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency.max(1);
        self
    }

    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> ScanConfig {
        self.config
    }
}
