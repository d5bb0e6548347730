//! 结果汇总：URL -> 技术列表
//!
//! 键按字典序排列（BTreeMap），同一URL多次出现时后写入的结果覆盖先前结果。

use std::collections::BTreeMap;
use serde::Serialize;

use crate::error::WsResult;
use crate::scanner::ScanResult;

/// 汇总报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AggregateReport {
    entries: BTreeMap<String, Vec<String>>,
}

impl AggregateReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入单个扫描结果，返回被覆盖的旧值
    pub fn insert(&mut self, result: ScanResult) -> Option<Vec<String>> {
        self.entries.insert(result.url, result.technologies)
    }

    pub fn get(&self, url: &str) -> Option<&[String]> {
        self.entries.get(url).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// 序列化为2空格缩进的JSON
    pub fn to_pretty_json(&self) -> WsResult<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}

impl Extend<ScanResult> for AggregateReport {
    fn extend<T: IntoIterator<Item = ScanResult>>(&mut self, iter: T) {
        for result in iter {
            self.insert(result);
        }
    }
}

impl FromIterator<ScanResult> for AggregateReport {
    fn from_iter<T: IntoIterator<Item = ScanResult>>(iter: T) -> Self {
        let mut report = Self::new();
        report.extend(iter);
        report
    }
}

/// 按顺序汇总扫描结果
pub fn aggregate(results: impl IntoIterator<Item = ScanResult>) -> AggregateReport {
    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(url: &str, techs: &[&str]) -> ScanResult {
        ScanResult {
            url: url.to_string(),
            technologies: techs.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn later_result_overwrites_earlier() {
        let report = aggregate([
            result("https://example.com", &["Nginx"]),
            result("https://other.example", &[]),
            result("https://example.com", &["Apache HTTP Server:2.4.57"]),
        ]);

        assert_eq!(report.len(), 2);
        assert_eq!(report.get("https://example.com"), Some(&["Apache HTTP Server:2.4.57".to_string()][..]));
        // 抓取失败的URL仍保留，值为空列表
        assert_eq!(report.get("https://other.example"), Some(&[][..]));
    }

    #[test]
    fn json_is_sorted_and_indented() {
        let report = aggregate([
            result("https://b.example", &["PHP", "Nginx:1.18.0"]),
            result("https://a.example", &[]),
        ]);

        let json = report.to_pretty_json().unwrap();
        let expected = "{\n  \"https://a.example\": [],\n  \"https://b.example\": [\n    \"PHP\",\n    \"Nginx:1.18.0\"\n  ]\n}";
        assert_eq!(json, expected);
        assert_eq!(report.urls().collect::<Vec<_>>(), vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn empty_report_is_empty_object() {
        assert_eq!(AggregateReport::new().to_pretty_json().unwrap(), "{}");
    }
}
