//! 检测器核心：整合各类分析器，输出检测结果
use std::collections::HashSet;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use tracing::debug;

use super::Fingerprinter;
use super::analyzer::{CookieAnalyzer, HeaderAnalyzer, HtmlAnalyzer, MetaAnalyzer, ScriptAnalyzer};
use crate::compiler::{CompiledRuleLibrary, RuleCompiler};
use crate::config::ScanConfig;
use crate::error::{WsResult, WappscanError};
use crate::extractor::HtmlExtractor;
use crate::rule::{RuleLibrary, RuleLoader};
use crate::utils::{DetectedMap, DetectionUpdater, HeaderConverter};

/// 技术检测器（规则加载后只读，可跨任务共享）
#[derive(Debug, Clone)]
pub struct TechDetector {
    compiled_lib: Arc<CompiledRuleLibrary>,
}

impl TechDetector {
    /// 按配置加载规则库并创建检测器
    pub async fn new(config: &ScanConfig) -> WsResult<Self> {
        let rule_lib = RuleLoader::load(config).await?;
        Self::from_rule_library(&rule_lib)
    }

    /// 从已加载的规则库创建检测器，空规则库视为初始化失败
    pub fn from_rule_library(rule_lib: &RuleLibrary) -> WsResult<Self> {
        let compiled_lib = RuleCompiler::compile(rule_lib)?;
        if compiled_lib.is_empty() {
            return Err(WappscanError::EngineInitError("规则库为空".to_string()));
        }

        Ok(Self {
            compiled_lib: Arc::new(compiled_lib),
        })
    }

    /// 已编译的技术规则数
    pub fn rule_count(&self) -> usize {
        self.compiled_lib.len()
    }

    /// 核心检测接口（HeaderMap + Body），返回 技术名 -> (置信度, 版本)
    pub fn detect(&self, headers: &HeaderMap, body: &[u8]) -> DetectedMap {
        // 1. 转换Header格式
        let header_hashmap = HeaderConverter::to_hashmap(headers);
        let single_header_map = HeaderConverter::to_single_value(&header_hashmap);
        let cookies = HeaderConverter::extract_cookies(headers);

        // 2. 提取HTML内容和标签
        let html_str = String::from_utf8_lossy(body);
        let html_tags = HtmlExtractor::extract(&html_str);

        // 3. 执行各类分析
        let mut detected = DetectedMap::new();
        HeaderAnalyzer::analyze(&self.compiled_lib, &single_header_map, &mut detected);
        CookieAnalyzer::analyze(&self.compiled_lib, &cookies, &mut detected);
        HtmlAnalyzer::analyze(&self.compiled_lib, &html_str, &mut detected);
        ScriptAnalyzer::analyze(&self.compiled_lib, &html_tags.script_srcs, &mut detected);
        MetaAnalyzer::analyze(&self.compiled_lib, &html_tags.meta_tags, &mut detected);

        // 4. 应用关联推导规则
        DetectionUpdater::apply_implies(&self.compiled_lib, &mut detected);

        debug!("检测完成，命中技术数：{}", detected.len());
        detected
    }
}

impl Fingerprinter for TechDetector {
    fn fingerprint(&self, headers: &HeaderMap, body: &[u8]) -> HashSet<String> {
        self.detect(headers, body)
            .into_iter()
            .map(|(name, (_, version))| format_technology(&name, version.as_deref()))
            .collect()
    }
}

/// 技术名称输出格式：有版本时为 `名称:版本`
pub fn format_technology(name: &str, version: Option<&str>) -> String {
    match version {
        Some(v) if !v.is_empty() => format!("{}:{}", name, v),
        _ => name.to_string(),
    }
}
