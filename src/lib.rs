//! wappscan - 批量抓取目标URL并识别网站技术栈

// 导出全局错误类型
pub use self::error::{WappscanError, WsResult};

// 导出配置模块
pub use self::config::{ConfigBuilder, ScanConfig, DEFAULT_RULES_URL};

// 导出命令行与日志
pub use self::cli::Cli;
pub use self::logging::init_logging;

// 导出输入模块
pub use self::input::UrlSource;

// 导出规则模块核心接口
pub use self::rule::{RuleCacheManager, RuleLibrary, RuleLoader, TechRule};

// 导出编译模块核心接口
pub use self::compiler::{CompiledPattern, CompiledRuleLibrary, CompiledTechRule, RuleCompiler};

// 导出指纹引擎
pub use self::engine::{Fingerprinter, TechDetector, format_technology, init_engine};

// 导出扫描与报告
pub use self::scanner::{ScanResult, Scanner, build_http_client};
pub use self::report::{AggregateReport, Reporter, aggregate};

// 声明所有子模块
pub mod cli;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod input;
pub mod logging;
pub mod report;
pub mod rule;
pub mod scanner;
pub mod utils;
