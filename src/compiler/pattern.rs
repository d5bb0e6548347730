//! 编译后模式模型
//! 正则编译后的结构

use std::collections::HashMap;
use regex::Regex;

/// 编译后的正则模式
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub regex: Regex,
    pub confidence: u8,
    pub version_template: Option<String>,
}

/// 技术编译后的规则
#[derive(Debug, Clone)]
pub struct CompiledTechRule {
    pub name: String,
    pub html_patterns: Option<Vec<CompiledPattern>>,
    pub script_patterns: Option<Vec<CompiledPattern>>,
    pub meta_patterns: Option<HashMap<String, Vec<CompiledPattern>>>,
    pub header_patterns: Option<HashMap<String, Vec<CompiledPattern>>>,
    pub cookie_patterns: Option<HashMap<String, Vec<CompiledPattern>>>,
    pub implies: Vec<String>,
}

/// 编译后的规则库
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleLibrary {
    pub tech_patterns: HashMap<String, CompiledTechRule>,
}

impl CompiledRuleLibrary {
    pub fn len(&self) -> usize {
        self.tech_patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tech_patterns.is_empty()
    }
}
