//! 规则数据模型定义
//! 仅存储规则数据，无任何业务逻辑，支持序列化/反序列化

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// 技术规则定义（从 wappalyzergo JSON 解析）
///
/// 模式字段既可能是单个字符串，也可能是字符串数组，统一以 `Value` 保存，编译阶段再展开。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TechRule {
    #[serde(rename = "cats", default, alias = "categories")]
    pub category_ids: Vec<u32>,

    // 检测规则
    #[serde(default)]
    pub html: Option<serde_json::Value>,
    #[serde(default, alias = "script")]
    pub scripts: Option<serde_json::Value>,
    #[serde(rename = "scriptSrc", default)]
    pub script_src: Option<serde_json::Value>,
    #[serde(default)]
    pub meta: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub cookies: Option<HashMap<String, serde_json::Value>>,

    // 关联规则
    #[serde(default)]
    pub implies: Option<serde_json::Value>,
}

/// 完整规则库
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RuleLibrary {
    pub tech_rules: HashMap<String, TechRule>,
}

/// wappalyzergo 的 fingerprints_data.json 顶层结构
#[derive(Debug, Deserialize)]
pub(crate) struct WappalyzerGoFingerprints {
    pub apps: HashMap<String, TechRule>,
}

impl From<WappalyzerGoFingerprints> for RuleLibrary {
    fn from(data: WappalyzerGoFingerprints) -> Self {
        Self { tech_rules: data.apps }
    }
}

impl RuleLibrary {
    /// 从 wappalyzergo JSON 文本解析规则库
    pub fn from_wappalyzergo_json(bytes: &[u8]) -> crate::WsResult<Self> {
        let data: WappalyzerGoFingerprints = serde_json::from_slice(bytes)
            .map_err(|e| crate::WappscanError::RuleParseError(format!("wappalyzergo JSON 解析失败：{}", e)))?;
        Ok(data.into())
    }
}
