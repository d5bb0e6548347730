//! Header格式转换工具
//! 不同Header格式之间的转换

use std::collections::HashMap;
use reqwest::header::{HeaderMap, SET_COOKIE};
use tracing::warn;

/// 单次转换处理的Header上限
const MAX_HEADER_ENTRIES: usize = 1000;

/// Header转换工具
pub struct HeaderConverter;

impl HeaderConverter {
    /// 将HeaderMap转换为HashMap<String, Vec<String>>（键小写，非UTF-8值按有损方式解码）
    pub fn to_hashmap(header_map: &HeaderMap) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();

        for (iter_count, (key, value)) in header_map.iter().enumerate() {
            if iter_count >= MAX_HEADER_ENTRIES {
                warn!("Header数量超过{}条，忽略剩余部分", MAX_HEADER_ENTRIES);
                break;
            }

            let value_str = String::from_utf8_lossy(value.as_bytes()).into_owned();
            map.entry(key.as_str().to_lowercase())
                .or_default()
                .push(value_str);
        }

        map
    }

    /// 将HashMap<String, Vec<String>>转换为单值HashMap<String, String>（取第一个非空值）
    pub fn to_single_value(hashmap: &HashMap<String, Vec<String>>) -> HashMap<String, String> {
        let mut single_map = HashMap::new();
        for (key, values) in hashmap {
            if let Some(first_val) = values.iter().find(|v| !v.is_empty()) {
                single_map.insert(key.clone(), first_val.clone());
            }
        }
        single_map
    }

    /// 从 Set-Cookie 中提取 cookie 名（小写） -> 值
    pub fn extract_cookies(header_map: &HeaderMap) -> HashMap<String, String> {
        let mut cookies = HashMap::new();

        for value in header_map.get_all(SET_COOKIE) {
            let raw = String::from_utf8_lossy(value.as_bytes());
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, cookie_value)) = pair.split_once('=') else {
                continue;
            };

            let name = name.trim();
            if !name.is_empty() {
                cookies.insert(name.to_lowercase(), cookie_value.trim().to_string());
            }
        }

        cookies
    }
}
