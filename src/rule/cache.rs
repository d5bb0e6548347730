//! 规则缓存管理
//! 仅处理规则库的本地序列化（MessagePack）和反序列化

use rmp_serde::{Serializer, from_slice};
use serde::Serialize;
use tracing::debug;

use super::model::RuleLibrary;
use crate::error::{WsResult, WappscanError};
use crate::config::ScanConfig;

/// 规则缓存管理器
pub struct RuleCacheManager;

impl RuleCacheManager {
    /// 从本地缓存加载规则库
    pub async fn load_from_cache(config: &ScanConfig) -> WsResult<RuleLibrary> {
        let cache_path = &config.rule_cache_path;
        let cache_data = tokio::fs::read(cache_path).await?;

        // MessagePack反序列化
        let rule_lib: RuleLibrary = from_slice(&cache_data)
            .map_err(|e| WappscanError::MsgPackError(format!("反序列化失败：{}", e)))?;

        if rule_lib.tech_rules.is_empty() {
            return Err(WappscanError::RuleCacheError(format!("缓存文件 {} 中没有规则", cache_path.display())));
        }

        debug!("缓存文件反序列化成功，技术规则数：{}", rule_lib.tech_rules.len());

        Ok(rule_lib)
    }

    /// 将规则库缓存到本地
    pub async fn save_to_cache(config: &ScanConfig, rule_lib: &RuleLibrary) -> WsResult<()> {
        let cache_path = &config.rule_cache_path;
        let mut cache_data = Vec::new();

        // MessagePack序列化（结构体按字段名写入，字段增减时旧缓存仍可读）
        rule_lib.serialize(&mut Serializer::new(&mut cache_data).with_struct_map())
            .map_err(|e| WappscanError::MsgPackError(format!("序列化失败：{}", e)))?;

        debug!("规则库序列化成功，序列化后数据大小：{} 字节", cache_data.len());

        if let Some(parent) = cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(cache_path, cache_data).await?;
        Ok(())
    }

    /// 清除本地缓存
    pub async fn clear_cache(config: &ScanConfig) -> WsResult<()> {
        let cache_path = &config.rule_cache_path;
        if tokio::fs::try_exists(cache_path).await? {
            tokio::fs::remove_file(cache_path).await?;
        }
        Ok(())
    }
}
