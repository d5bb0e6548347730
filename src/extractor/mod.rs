//! 提取模块：从响应体中提取检测所需的HTML标签
pub mod html_extractor;

pub use self::html_extractor::{HtmlExtractor, HtmlTags};
