//! 规则编译器核心
//! 仅负责将原始规则编译为可执行的正则模式

use std::collections::HashMap;
use std::time::Instant;
use regex::RegexBuilder;
use serde_json::Value;
use tracing::debug;

use super::pattern::{CompiledPattern, CompiledTechRule, CompiledRuleLibrary};
use crate::rule::{RuleLibrary, TechRule};
use crate::error::{WsResult, WappscanError};

/// 模式附加属性分隔符（wappalyzer 写法：`regex\;version:\1\;confidence:50`）
const ATTR_SEPARATOR: &str = "\\;";

/// Rust regex 支持的字母转义
const SUPPORTED_ESCAPES: &str = "dDwWsSbBAzntrfvxupP";

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 编译规则库
    pub fn compile(rule_lib: &RuleLibrary) -> WsResult<CompiledRuleLibrary> {
        let start = Instant::now();
        let mut compiled_tech_rules = HashMap::with_capacity(rule_lib.tech_rules.len());

        let mut compile_stats = CompileStats::default();
        for (tech_name, tech_rule) in &rule_lib.tech_rules {
            let compiled_tech = Self::compile_tech_rule(tech_name, tech_rule, &mut compile_stats)?;
            compiled_tech_rules.insert(tech_name.clone(), compiled_tech);
        }

        debug!("规则编译完成，总耗时{:?}", start.elapsed());
        debug!(
            "编译统计：HTML模式{}条、Script模式{}条、Header模式{}条、Cookie模式{}条、Meta模式{}条，跳过{}条",
            compile_stats.html_count,
            compile_stats.script_count,
            compile_stats.header_count,
            compile_stats.cookie_count,
            compile_stats.meta_count,
            compile_stats.skipped_count
        );

        Ok(CompiledRuleLibrary {
            tech_patterns: compiled_tech_rules,
        })
    }

    /// 编译单个技术规则
    fn compile_tech_rule(
        tech_name: &str,
        tech_rule: &TechRule,
        stats: &mut CompileStats,
    ) -> WsResult<CompiledTechRule> {
        let html_patterns = Self::compile_pattern_list(tech_name, tech_rule.html.as_ref(), stats, PatternKind::Html)?;

        // 合并 scripts 与 scriptSrc，均匹配 <script src>
        let mut script_patterns = Vec::new();
        for value in [tech_rule.scripts.as_ref(), tech_rule.script_src.as_ref()] {
            if let Some(mut patterns) = Self::compile_pattern_list(tech_name, value, stats, PatternKind::Script)? {
                script_patterns.append(&mut patterns);
            }
        }

        let meta_patterns = Self::compile_keyed_patterns(tech_name, tech_rule.meta.as_ref(), stats, PatternKind::Meta)?;
        let header_patterns = Self::compile_keyed_patterns(tech_name, tech_rule.headers.as_ref(), stats, PatternKind::Header)?;
        let cookie_patterns = Self::compile_keyed_patterns(tech_name, tech_rule.cookies.as_ref(), stats, PatternKind::Cookie)?;

        Ok(CompiledTechRule {
            name: tech_name.to_string(),
            html_patterns,
            script_patterns: (!script_patterns.is_empty()).then_some(script_patterns),
            meta_patterns,
            header_patterns,
            cookie_patterns,
            implies: tech_rule.implies.as_ref().map(Self::parse_implies).unwrap_or_default(),
        })
    }

    /// 编译列表型模式（html/script等）
    fn compile_pattern_list(
        tech_name: &str,
        value: Option<&Value>,
        stats: &mut CompileStats,
        kind: PatternKind,
    ) -> WsResult<Option<Vec<CompiledPattern>>> {
        let raw_patterns: Vec<&str> = match value {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(arr)) => arr.iter().filter_map(Value::as_str).collect(),
            Some(_) => {
                return Err(WappscanError::RuleParseError(format!(
                    "技术 {} 的{}规则类型不支持",
                    tech_name,
                    kind.label()
                )));
            }
        };

        let mut patterns = Vec::with_capacity(raw_patterns.len());
        for raw in raw_patterns {
            match Self::compile_single_pattern(raw) {
                Ok(pattern) => {
                    patterns.push(pattern);
                    stats.record(kind);
                }
                Err(e) => {
                    debug!("跳过无法编译的{}规则：技术={}，规则={}，错误={}", kind.label(), tech_name, raw, e);
                    stats.skipped_count += 1;
                }
            }
        }

        Ok((!patterns.is_empty()).then_some(patterns))
    }

    /// 编译键值对型模式（meta/header/cookie），键统一小写
    fn compile_keyed_patterns(
        tech_name: &str,
        value: Option<&HashMap<String, Value>>,
        stats: &mut CompileStats,
        kind: PatternKind,
    ) -> WsResult<Option<HashMap<String, Vec<CompiledPattern>>>> {
        let Some(value) = value else {
            return Ok(None);
        };

        let mut keyed_patterns = HashMap::new();
        for (key, val) in value {
            if let Some(patterns) = Self::compile_pattern_list(tech_name, Some(val), stats, kind)? {
                keyed_patterns.insert(key.to_lowercase(), patterns);
            }
        }

        Ok((!keyed_patterns.is_empty()).then_some(keyed_patterns))
    }

    /// 编译单个正则模式（修复Wappalyzer正则兼容性问题）
    pub fn compile_single_pattern(raw_pattern: &str) -> WsResult<CompiledPattern> {
        // 1. 拆分正则与附加属性
        let (regex_part, version_template, confidence) = Self::split_pattern_attrs(raw_pattern);

        // 2. 清理原始正则
        let mut cleaned_pattern = regex_part.to_string();

        // 移除PCRE分隔符
        if cleaned_pattern.len() >= 2 && cleaned_pattern.starts_with('/') && cleaned_pattern.ends_with('/') {
            cleaned_pattern = cleaned_pattern[1..cleaned_pattern.len() - 1].to_string();
        }

        cleaned_pattern = Self::strip_lookarounds(&cleaned_pattern);
        cleaned_pattern = Self::clean_invalid_escapes(&cleaned_pattern);
        cleaned_pattern = Self::fix_charset_hyphen(&cleaned_pattern);
        cleaned_pattern = Self::fix_unbalanced_groups(&cleaned_pattern);

        // 3. 编译正则（wappalyzer 规则不区分大小写）
        let regex = RegexBuilder::new(&cleaned_pattern)
            .case_insensitive(true)
            .build()?;

        Ok(CompiledPattern {
            regex,
            confidence,
            version_template,
        })
    }

    /// 拆分 `regex\;version:..\;confidence:..`
    fn split_pattern_attrs(raw_pattern: &str) -> (&str, Option<String>, u8) {
        let mut parts = raw_pattern.split(ATTR_SEPARATOR);
        let regex_part = parts.next().unwrap_or_default();
        let mut version_template = None;
        let mut confidence = 100;

        for attr in parts {
            if let Some(template) = attr.strip_prefix("version:") {
                version_template = Some(template.to_string());
            } else if let Some(value) = attr.strip_prefix("confidence:") {
                if let Ok(value) = value.trim().parse::<u8>() {
                    confidence = value.min(100);
                }
            }
        }

        (regex_part, version_template, confidence)
    }

    /// 解析implies规则（字符串支持逗号分隔，去掉 `\;confidence:..` 附加属性）
    pub fn parse_implies(implies: &Value) -> Vec<String> {
        let raw: Vec<&str> = match implies {
            Value::String(s) => s.split(',').collect(),
            Value::Array(arr) => arr.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };

        raw.into_iter()
            .filter_map(|item| item.split(ATTR_SEPARATOR).next())
            .map(str::trim)
            .filter(|tech| !tech.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 移除环视语法（Rust regex 不支持），连同其内部内容一起删除
    fn strip_lookarounds(s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == '\\' {
                result.push(c);
                if let Some(&next_c) = chars.get(i + 1) {
                    result.push(next_c);
                }
                i += 2;
                continue;
            }

            if c == '(' && Self::is_lookaround(&chars[i..]) {
                let mut depth = 0;
                let mut j = i;
                while j < chars.len() {
                    match chars[j] {
                        '\\' => {
                            j += 2;
                            continue;
                        }
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                    j += 1;
                }
                i = j + 1;
                continue;
            }

            result.push(c);
            i += 1;
        }

        result
    }

    fn is_lookaround(chars: &[char]) -> bool {
        matches!(chars, ['(', '?', '=' | '!', ..] | ['(', '?', '<', '=' | '!', ..])
    }

    /// 清理无效转义符（反向引用整体删除，不支持的字母转义去掉反斜杠）
    fn clean_invalid_escapes(s: &str) -> String {
        let mut cleaned = String::with_capacity(s.len());
        let mut chars = s.chars();

        while let Some(c) = chars.next() {
            if c != '\\' {
                cleaned.push(c);
                continue;
            }

            match chars.next() {
                None => {}
                Some(next_c) if next_c.is_ascii_digit() => {}
                Some(next_c) if (next_c.is_ascii() && !next_c.is_ascii_alphanumeric()) || SUPPORTED_ESCAPES.contains(next_c) => {
                    cleaned.push(c);
                    cleaned.push(next_c);
                }
                Some(next_c) => cleaned.push(next_c),
            }
        }

        cleaned
    }

    /// 修复字符集中的无效连字符（如 `[\w-.]`）以及未转义的 `[`
    fn fix_charset_hyphen(s: &str) -> String {
        const CLASS_ESCAPES: &str = "dDwWsS";
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len());
        let mut in_charset = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == '\\' {
                result.push(c);
                if let Some(&next_c) = chars.get(i + 1) {
                    result.push(next_c);
                }
                i += 2;
                continue;
            }

            if !in_charset {
                result.push(c);
                i += 1;
                if c == '[' {
                    in_charset = true;
                    // 开头的 ^ 与 ] 都是字面量
                    if chars.get(i) == Some(&'^') {
                        result.push('^');
                        i += 1;
                    }
                    if chars.get(i) == Some(&']') {
                        result.push(']');
                        i += 1;
                    }
                }
                continue;
            }

            match c {
                ']' => {
                    in_charset = false;
                    result.push(c);
                }
                '[' if chars.get(i + 1) != Some(&':') => result.push_str("\\["),
                '-' => {
                    let prev_is_class = i >= 2 && chars[i - 2] == '\\' && CLASS_ESCAPES.contains(chars[i - 1]);
                    let next_is_class = chars.get(i + 1) == Some(&'\\')
                        && chars.get(i + 2).is_some_and(|n| CLASS_ESCAPES.contains(*n));
                    if prev_is_class || next_is_class {
                        result.push_str("\\-");
                    } else {
                        result.push('-');
                    }
                }
                _ => result.push(c),
            }
            i += 1;
        }

        result
    }

    /// 修复未闭合分组：多余的 `)` 与未闭合的 `(` 都会被删除
    fn fix_unbalanced_groups(s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut keep = vec![true; chars.len()];
        let mut open_groups = Vec::new();
        let mut in_charset = false;
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '\\' => {
                    i += 2;
                    continue;
                }
                '[' if !in_charset => in_charset = true,
                ']' if in_charset => in_charset = false,
                '(' if !in_charset => open_groups.push(i),
                ')' if !in_charset => {
                    if open_groups.pop().is_none() {
                        keep[i] = false;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        for idx in open_groups {
            keep[idx] = false;
        }

        chars.into_iter()
            .zip(keep)
            .filter_map(|(c, keep)| keep.then_some(c))
            .collect()
    }
}

/// 模式类型（用于统计与日志）
#[derive(Debug, Clone, Copy)]
enum PatternKind {
    Html,
    Script,
    Header,
    Cookie,
    Meta,
}

impl PatternKind {
    fn label(self) -> &'static str {
        match self {
            PatternKind::Html => "HTML",
            PatternKind::Script => "Script",
            PatternKind::Header => "Header",
            PatternKind::Cookie => "Cookie",
            PatternKind::Meta => "Meta",
        }
    }
}

/// 编译统计信息
#[derive(Debug, Clone, Default)]
struct CompileStats {
    html_count: usize,
    script_count: usize,
    header_count: usize,
    cookie_count: usize,
    meta_count: usize,
    skipped_count: usize,
}

impl CompileStats {
    fn record(&mut self, kind: PatternKind) {
        match kind {
            PatternKind::Html => self.html_count += 1,
            PatternKind::Script => self.script_count += 1,
            PatternKind::Header => self.header_count += 1,
            PatternKind::Cookie => self.cookie_count += 1,
            PatternKind::Meta => self.meta_count += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_version_and_confidence() {
        let pattern = RuleCompiler::compile_single_pattern(r"nginx(?:/([\d.]+))?\;version:\1\;confidence:50").unwrap();
        assert_eq!(pattern.version_template.as_deref(), Some(r"\1"));
        assert_eq!(pattern.confidence, 50);
        assert!(pattern.regex.is_match("NGINX/1.18.0"));
    }

    #[test]
    fn empty_pattern_matches_presence() {
        let pattern = RuleCompiler::compile_single_pattern("").unwrap();
        assert_eq!(pattern.confidence, 100);
        assert!(pattern.regex.is_match("anything"));
    }

    #[test]
    fn strips_lookaround_and_backreference() {
        let pattern = RuleCompiler::compile_single_pattern(r"foo(?!bar)baz\1").unwrap();
        assert_eq!(pattern.regex.as_str(), "foobaz");

        let pattern = RuleCompiler::compile_single_pattern(r"(?<=x(y))z").unwrap();
        assert_eq!(pattern.regex.as_str(), "z");
    }

    #[test]
    fn keeps_ranges_but_escapes_class_hyphen() {
        assert_eq!(RuleCompiler::fix_charset_hyphen(r"[a-z]"), r"[a-z]");
        assert_eq!(RuleCompiler::fix_charset_hyphen(r"[\w-.]+"), r"[\w\-.]+");
        assert_eq!(RuleCompiler::fix_charset_hyphen(r"[.-\d]"), r"[.\-\d]");
        assert!(RuleCompiler::compile_single_pattern(r"/[\w-.]+/").is_ok());
    }

    #[test]
    fn removes_unbalanced_parens() {
        assert_eq!(RuleCompiler::fix_unbalanced_groups("a)b(c"), "abc");
        assert_eq!(RuleCompiler::fix_unbalanced_groups(r"(a\)b)"), r"(a\)b)");
        assert_eq!(RuleCompiler::fix_unbalanced_groups("[(]x"), "[(]x");
    }

    #[test]
    fn cleans_unknown_letter_escapes() {
        assert_eq!(RuleCompiler::clean_invalid_escapes(r"\d\.\i\/"), r"\d\.i\/");
    }

    #[test]
    fn parses_implies_variants() {
        assert_eq!(RuleCompiler::parse_implies(&json!("PHP, MySQL")), vec!["PHP", "MySQL"]);
        assert_eq!(
            RuleCompiler::parse_implies(&json!(["PHP\\;confidence:50", " ", "Apache HTTP Server"])),
            vec!["PHP", "Apache HTTP Server"]
        );
        assert!(RuleCompiler::parse_implies(&json!(3)).is_empty());
    }

    #[test]
    fn compiles_library_and_skips_bad_patterns() {
        let lib = RuleLibrary::from_wappalyzergo_json(br#"{
            "apps": {
                "Broken": { "html": ["(?P<unterminated", "<div id=\"ok\">"] },
                "Nginx": { "headers": { "Server": "nginx(?:/([\\d.]+))?\\;version:\\1" }, "implies": "C" }
            }
        }"#).unwrap();

        let compiled = RuleCompiler::compile(&lib).unwrap();
        assert_eq!(compiled.len(), 2);

        let broken = &compiled.tech_patterns["Broken"];
        assert_eq!(broken.html_patterns.as_ref().unwrap().len(), 1);

        let nginx = &compiled.tech_patterns["Nginx"];
        assert!(nginx.header_patterns.as_ref().unwrap().contains_key("server"));
        assert_eq!(nginx.implies, vec!["C"]);
    }

    #[test]
    fn unsupported_value_type_is_an_error() {
        let lib = RuleLibrary::from_wappalyzergo_json(br#"{"apps": {"Odd": {"html": 42}}}"#).unwrap();
        assert!(matches!(RuleCompiler::compile(&lib), Err(WappscanError::RuleParseError(_))));
    }
}
