//! URL列表读取
//! 每行一个URL，去除首尾空白并跳过空行，保持输入顺序；不做任何格式校验

use std::path::Path;
use tracing::debug;

use crate::error::{WsResult, WappscanError};

/// URL来源
pub struct UrlSource;

impl UrlSource {
    /// 读取URL列表文件，文件无法读取时返回错误
    pub async fn load(path: impl AsRef<Path>) -> WsResult<Vec<String>> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| WappscanError::InputError {
            path: path.display().to_string(),
            source,
        })?;

        let urls = Self::parse(&String::from_utf8_lossy(&bytes));
        debug!("读取URL列表完成：{}，有效行数：{}", path.display(), urls.len());
        Ok(urls)
    }

    /// 按行解析URL
    pub fn parse(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_skips_blank_lines() {
        let text = "  https://a.example \r\n\n\t\nhttps://b.example\nnot a url\n   \nhttps://a.example";
        assert_eq!(
            UrlSource::parse(text),
            vec!["https://a.example", "https://b.example", "not a url", "https://a.example"]
        );
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(UrlSource::parse("").is_empty());
        assert!(UrlSource::parse("\n \n\t\n").is_empty());
    }

    #[tokio::test]
    async fn loads_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        tokio::fs::write(file.path(), "https://example.com\n\nhttps://example.com\n").await.unwrap();

        let urls = UrlSource::load(file.path()).await.unwrap();
        assert_eq!(urls, vec!["https://example.com", "https://example.com"]);
    }

    #[tokio::test]
    async fn missing_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = UrlSource::load(dir.path().join("nope.txt")).await.unwrap_err();
        assert!(matches!(err, WappscanError::InputError { .. }));
    }
}
