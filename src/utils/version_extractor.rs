//! 版本提取工具模块
//! 根据版本模板从正则捕获结果中提取版本号，支持 \1 与 $1 两种分组引用

use regex::Captures;

/// 版本提取工具类
pub struct VersionExtractor;

impl VersionExtractor {
    /// 从正则捕获结果中提取有效版本号
    ///
    /// 支持三元写法 `\1?a:b`：分组1有值时取 `a`（`a` 为空则取分组1本身），否则取 `b`。
    /// 模板未引用任何已匹配分组、结果为空或仍残留占位符时返回 `None`。
    pub fn extract(version_template: Option<&str>, captures: &Captures) -> Option<String> {
        let template = version_template.filter(|t| !t.trim().is_empty())?;

        let Some((condition, branches)) = template.split_once('?') else {
            return Self::substitute(template, captures, false);
        };

        let (when_set, when_unset) = branches.split_once(':').unwrap_or((branches, ""));
        let group_index = Self::placeholder_index(condition.trim())?;
        let group_text = captures
            .get(group_index)
            .map(|m| m.as_str().trim())
            .filter(|text| !text.is_empty());

        match group_text {
            Some(text) if when_set.trim().is_empty() => Some(text.to_string()),
            Some(_) => Self::substitute(when_set, captures, true),
            None => Self::substitute(when_unset, captures, true),
        }
    }

    /// `\N` / `$N` 形式的分组编号
    fn placeholder_index(placeholder: &str) -> Option<usize> {
        placeholder
            .strip_prefix('\\')
            .or_else(|| placeholder.strip_prefix('$'))
            .and_then(|index| index.parse().ok())
    }

    /// 替换分组占位符；三元分支允许纯字面量（如 `\1?4.x:`）
    fn substitute(template: &str, captures: &Captures, literal_ok: bool) -> Option<String> {
        let mut version = template.to_string();
        let mut replaced = false;

        // 倒序替换，避免 \1 误替换 \10 的前缀
        for group_index in (1..captures.len()).rev() {
            let matched = captures.get(group_index).map(|m| m.as_str().trim()).unwrap_or_default();
            for placeholder in [format!("\\{}", group_index), format!("${}", group_index)] {
                if version.contains(&placeholder) {
                    replaced |= !matched.is_empty();
                    version = version.replace(&placeholder, matched);
                }
            }
        }

        let final_version = version.trim();
        if !(replaced || literal_ok) || final_version.is_empty() || final_version.contains(['\\', '$', '?', ':']) {
            return None;
        }

        Some(final_version.to_string())
    }
}
