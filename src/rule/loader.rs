//! 规则加载管理器
//! 负责从本地文件、本地缓存或远程拉取规则库

use std::time::Duration;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::model::RuleLibrary;
use super::cache::RuleCacheManager;
use crate::error::{WsResult, WappscanError};
use crate::config::ScanConfig;

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 加载规则库
    ///
    /// 顺序：指定的本地规则文件 > 本地缓存 > 远程拉取（成功后写回缓存）。
    pub async fn load(config: &ScanConfig) -> WsResult<RuleLibrary> {
        // 1. 显式指定的本地规则文件，失败直接返回错误
        if let Some(path) = &config.rules_path {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                WappscanError::RuleLoadError(format!("读取本地规则文件 {} 失败：{}", path.display(), e))
            })?;
            let rule_lib = RuleLibrary::from_wappalyzergo_json(&bytes)?;
            info!("从本地文件加载规则库成功：{}，技术规则数：{}", path.display(), rule_lib.tech_rules.len());
            return Ok(rule_lib);
        }

        // 2. 本地缓存
        if !config.refresh_rules {
            match RuleCacheManager::load_from_cache(config).await {
                Ok(rule_lib) => {
                    debug!("从本地缓存加载规则库成功");
                    return Ok(rule_lib);
                }
                Err(e) => warn!("本地缓存不存在或损坏（{}），将拉取远程规则库", e),
            }
        }

        // 3. 远程规则库
        let rule_lib = Self::fetch_remote(config).await?;

        // 4. 缓存到本地
        if let Err(e) = RuleCacheManager::save_to_cache(config, &rule_lib).await {
            warn!("规则库缓存到本地失败：{}", e);
        } else {
            debug!("远程规则库已缓存到本地：{}", config.rule_cache_path.display());
        }

        Ok(rule_lib)
    }

    /// 强制拉取远程规则库（原始URL失败时尝试GitHub代理URL）
    pub async fn fetch_remote(config: &ScanConfig) -> WsResult<RuleLibrary> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.rule_timeout))
            .user_agent(config.user_agent.as_str())
            .build()?;

        debug!("开始拉取远程规则库，URL：{}", config.rules_url);
        let first_err = match Self::fetch_rule_file(&client, &config.rules_url).await {
            Ok(rule_lib) => {
                info!("成功拉取远程规则库，技术规则数：{}", rule_lib.tech_rules.len());
                return Ok(rule_lib);
            }
            Err(e) => e,
        };

        let Some(fallback_url) = Self::proxy_url(config) else {
            return Err(first_err);
        };

        warn!("拉取远程规则库失败：{}，尝试代理URL：{}", first_err, fallback_url);
        match Self::fetch_rule_file(&client, &fallback_url).await {
            Ok(rule_lib) => {
                info!("通过代理成功拉取远程规则库，技术规则数：{}", rule_lib.tech_rules.len());
                Ok(rule_lib)
            }
            Err(proxy_e) => Err(WappscanError::RuleLoadError(format!(
                "远程规则库拉取失败：{}；代理URL也失败：{}",
                first_err, proxy_e
            ))),
        }
    }

    /// 拼接代理URL，仅对 https 地址且配置了代理前缀时生效
    fn proxy_url(config: &ScanConfig) -> Option<String> {
        if config.gh_proxy_url.is_empty() {
            return None;
        }
        let proxy_path = config.rules_url.strip_prefix("https://")?;
        Some(format!("{}{}", config.gh_proxy_url, proxy_path))
    }

    /// 拉取 wappalyzergo 格式的完整规则文件
    async fn fetch_rule_file(client: &Client, url: &str) -> WsResult<RuleLibrary> {
        let response = client.get(url)
            .header("Accept-Encoding", "gzip, deflate")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WappscanError::RuleLoadError(format!(
                "URL {} 返回状态码 {}",
                url, response.status()
            )));
        }

        let bytes = response.bytes().await?;
        RuleLibrary::from_wappalyzergo_json(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_rules_file_takes_priority() {
        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("fingerprints.json");
        tokio::fs::write(&rules_path, br#"{"apps": {"Nginx": {"headers": {"server": "nginx"}}}}"#)
            .await
            .unwrap();

        let config = ScanConfig::builder()
            .rules_path(Some(rules_path))
            .rule_cache_path(dir.path().join("unused.mp"))
            .rules_url("http://127.0.0.1:1/never".to_string())
            .build();

        let lib = RuleLoader::load(&config).await.unwrap();
        assert!(lib.tech_rules.contains_key("Nginx"));
        // 本地文件不会写入缓存
        assert!(!dir.path().join("unused.mp").exists());
    }

    #[tokio::test]
    async fn missing_local_rules_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScanConfig::builder()
            .rules_path(Some(dir.path().join("absent.json")))
            .build();

        let err = RuleLoader::load(&config).await.unwrap_err();
        assert!(matches!(err, WappscanError::RuleLoadError(_)));
    }

    #[tokio::test]
    async fn cache_is_used_before_remote() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScanConfig::builder()
            .rule_cache_path(dir.path().join("rules.mp"))
            .rules_url("http://127.0.0.1:1/never".to_string())
            .gh_proxy_url(String::new())
            .build();

        let lib = RuleLibrary::from_wappalyzergo_json(br#"{"apps": {"PHP": {"headers": {"x-powered-by": "php"}}}}"#)
            .unwrap();
        RuleCacheManager::save_to_cache(&config, &lib).await.unwrap();

        let loaded = RuleLoader::load(&config).await.unwrap();
        assert!(loaded.tech_rules.contains_key("PHP"));
    }

    #[test]
    fn proxy_url_only_for_https() {
        let mut config = ScanConfig::default();
        assert!(RuleLoader::proxy_url(&config).is_none());

        config.gh_proxy_url = "https://ghfast.top/".to_string();
        assert_eq!(
            RuleLoader::proxy_url(&config).as_deref(),
            Some("https://ghfast.top/raw.githubusercontent.com/projectdiscovery/wappalyzergo/refs/heads/main/fingerprints_data.json")
        );

        config.rules_url = "http://mirror.local/rules.json".to_string();
        assert!(RuleLoader::proxy_url(&config).is_none());

        config.rules_url = "https://mirror.local/rules.json".to_string();
        config.gh_proxy_url.clear();
        assert!(RuleLoader::proxy_url(&config).is_none());
    }
}
