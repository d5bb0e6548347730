//! 报告模块：结果汇总与JSON输出
pub mod aggregate;
pub mod emit;

pub use self::aggregate::{AggregateReport, aggregate};
pub use self::emit::Reporter;
