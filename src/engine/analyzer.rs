//! 检测分析器：负责Header/Cookie/HTML/Script/Meta数据的匹配
use std::collections::HashMap;
use tracing::debug;

use crate::compiler::{CompiledPattern, CompiledRuleLibrary};
use crate::utils::{DetectedMap, DetectionUpdater, VersionExtractor};

/// 用单个模式匹配输入，命中则写入检测结果
fn apply_pattern(
    tech_name: &str,
    pattern: &CompiledPattern,
    input: &str,
    detected: &mut DetectedMap,
) -> bool {
    let Some(captures) = pattern.regex.captures(input) else {
        return false;
    };

    let version = VersionExtractor::extract(pattern.version_template.as_deref(), &captures);
    DetectionUpdater::update(detected, tech_name, pattern.confidence, version);
    true
}

/// 键值对型模式（header/cookie/meta）的公共匹配逻辑
fn analyze_keyed<'a, F>(
    compiled_lib: &'a CompiledRuleLibrary,
    values: &HashMap<String, String>,
    select: F,
    source: &str,
    detected: &mut DetectedMap,
) where
    F: Fn(&'a crate::compiler::CompiledTechRule) -> Option<&'a HashMap<String, Vec<CompiledPattern>>>,
{
    for compiled_tech in compiled_lib.tech_patterns.values() {
        let Some(keyed_patterns) = select(compiled_tech) else {
            continue;
        };

        for (key, patterns) in keyed_patterns {
            let Some(value) = values.get(key) else {
                continue;
            };

            for pattern in patterns {
                if apply_pattern(&compiled_tech.name, pattern, value, detected) {
                    debug!(
                        "{}匹配成功：技术={}，键={}，规则={}",
                        source,
                        compiled_tech.name,
                        key,
                        pattern.regex.as_str()
                    );
                }
            }
        }
    }
}

/// Header分析器
pub struct HeaderAnalyzer;

impl HeaderAnalyzer {
    /// 分析Header提取技术（键为小写Header名）
    pub fn analyze(
        compiled_lib: &CompiledRuleLibrary,
        headers: &HashMap<String, String>,
        detected: &mut DetectedMap,
    ) {
        analyze_keyed(compiled_lib, headers, |t| t.header_patterns.as_ref(), "Header", detected);
    }
}

/// Cookie分析器
pub struct CookieAnalyzer;

impl CookieAnalyzer {
    /// 分析Set-Cookie提取技术（键为小写cookie名）
    pub fn analyze(
        compiled_lib: &CompiledRuleLibrary,
        cookies: &HashMap<String, String>,
        detected: &mut DetectedMap,
    ) {
        analyze_keyed(compiled_lib, cookies, |t| t.cookie_patterns.as_ref(), "Cookie", detected);
    }
}

/// Meta分析器
pub struct MetaAnalyzer;

impl MetaAnalyzer {
    /// 分析Meta标签提取技术
    pub fn analyze(
        compiled_lib: &CompiledRuleLibrary,
        meta_tags: &[(String, String)],
        detected: &mut DetectedMap,
    ) {
        for (meta_name, content) in meta_tags {
            for compiled_tech in compiled_lib.tech_patterns.values() {
                let Some(patterns) = compiled_tech.meta_patterns.as_ref().and_then(|m| m.get(meta_name)) else {
                    continue;
                };

                for pattern in patterns {
                    apply_pattern(&compiled_tech.name, pattern, content, detected);
                }
            }
        }
    }
}

/// HTML分析器
pub struct HtmlAnalyzer;

impl HtmlAnalyzer {
    /// 分析HTML内容提取技术
    pub fn analyze(
        compiled_lib: &CompiledRuleLibrary,
        html: &str,
        detected: &mut DetectedMap,
    ) {
        if html.is_empty() {
            return;
        }

        for compiled_tech in compiled_lib.tech_patterns.values() {
            let Some(html_patterns) = &compiled_tech.html_patterns else {
                continue;
            };

            for pattern in html_patterns {
                apply_pattern(&compiled_tech.name, pattern, html, detected);
            }
        }
    }
}

/// Script分析器
pub struct ScriptAnalyzer;

impl ScriptAnalyzer {
    /// 分析Script-SRC提取技术
    pub fn analyze(
        compiled_lib: &CompiledRuleLibrary,
        script_srcs: &[String],
        detected: &mut DetectedMap,
    ) {
        for src in script_srcs {
            for compiled_tech in compiled_lib.tech_patterns.values() {
                let Some(script_patterns) = &compiled_tech.script_patterns else {
                    continue;
                };

                // 同一脚本只取该技术第一条命中的模式
                for pattern in script_patterns {
                    if apply_pattern(&compiled_tech.name, pattern, src, detected) {
                        break;
                    }
                }
            }
        }
    }
}
