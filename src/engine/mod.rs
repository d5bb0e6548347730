//! 指纹引擎：`Fingerprint(headers, body) -> 技术名集合`
//!
//! 扫描流程只依赖 [`Fingerprinter`]，默认实现 [`TechDetector`] 基于 wappalyzergo 指纹库。
pub mod analyzer;
pub mod detector;

use std::collections::HashSet;

use reqwest::header::HeaderMap;
use tracing::info;

use crate::config::ScanConfig;
use crate::error::{WsResult, WappscanError};

pub use self::detector::{TechDetector, format_technology};

/// 指纹识别能力（初始化后只读，可并发调用）
pub trait Fingerprinter: Send + Sync {
    /// 根据响应头与响应体识别技术，返回 `名称` 或 `名称:版本`
    fn fingerprint(&self, headers: &HeaderMap, body: &[u8]) -> HashSet<String>;
}

/// 初始化指纹引擎，任何失败都作为初始化错误返回
pub async fn init_engine(config: &ScanConfig) -> WsResult<TechDetector> {
    let detector = TechDetector::new(config).await.map_err(|e| match e {
        WappscanError::EngineInitError(_) => e,
        other => WappscanError::EngineInitError(other.to_string()),
    })?;

    info!("指纹引擎初始化完成，技术规则数：{}", detector.rule_count());
    Ok(detector)
}
