//! 检测结果更新工具
//! 负责更新检测结果（叠加置信度、保留版本）

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::compiler::CompiledRuleLibrary;

/// 检测中间结果：技术名 -> (置信度, 版本)
pub type DetectedMap = HashMap<String, (u8, Option<String>)>;

/// 隐含技术的默认置信度
const IMPLIED_CONFIDENCE: u8 = 50;

/// 检测结果更新工具
pub struct DetectionUpdater;

impl DetectionUpdater {
    /// 更新检测结果
    pub fn update(
        detected: &mut DetectedMap,
        tech_name: &str,
        confidence: u8,
        version: Option<String>,
    ) {
        match detected.entry(tech_name.to_string()) {
            Entry::Occupied(mut entry) => {
                let (existing_conf, existing_version) = entry.get_mut();
                *existing_conf = existing_conf.saturating_add(confidence).min(100);

                if existing_version.is_none() {
                    *existing_version = version;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert((confidence.min(100), version));
            }
        }
    }

    /// 应用关联推导规则（implies），隐含技术本身的 implies 也会继续展开
    pub fn apply_implies(compiled_lib: &CompiledRuleLibrary, detected: &mut DetectedMap) {
        let mut pending: Vec<String> = detected.keys().cloned().collect();

        while let Some(tech_name) = pending.pop() {
            let Some(compiled_tech) = compiled_lib.tech_patterns.get(&tech_name) else {
                continue;
            };

            for implied in &compiled_tech.implies {
                if !detected.contains_key(implied) {
                    detected.insert(implied.clone(), (IMPLIED_CONFIDENCE, None));
                    pending.push(implied.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::RuleCompiler;
    use crate::rule::RuleLibrary;

    #[test]
    fn confidence_accumulates_and_first_version_wins() {
        let mut detected = DetectedMap::new();
        DetectionUpdater::update(&mut detected, "PHP", 50, None);
        DetectionUpdater::update(&mut detected, "PHP", 80, Some("8.1".to_string()));
        DetectionUpdater::update(&mut detected, "PHP", 100, Some("7.4".to_string()));

        assert_eq!(detected["PHP"], (100, Some("8.1".to_string())));
    }

    #[test]
    fn implies_are_transitive() {
        let lib = RuleLibrary::from_wappalyzergo_json(br#"{
            "apps": {
                "WordPress": { "implies": ["PHP", "MySQL"] },
                "PHP": { "implies": "Zend" }
            }
        }"#).unwrap();
        let compiled = RuleCompiler::compile(&lib).unwrap();

        let mut detected = DetectedMap::new();
        DetectionUpdater::update(&mut detected, "WordPress", 100, Some("6.4".to_string()));
        DetectionUpdater::apply_implies(&compiled, &mut detected);

        assert_eq!(detected.len(), 4);
        assert_eq!(detected["Zend"], (50, None));
        assert_eq!(detected["WordPress"].1.as_deref(), Some("6.4"));
    }
}
