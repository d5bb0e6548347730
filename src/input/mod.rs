//! 输入模块：目标URL列表
pub mod url_source;

pub use self::url_source::UrlSource;
