//! 扫描模块：HTTP抓取与指纹识别
pub mod client;
pub mod worker;

pub use self::client::build_http_client;
pub use self::worker::{ScanResult, Scanner};
