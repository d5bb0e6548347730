//! 报告输出：同一份JSON写入日志一次、标准输出一次

use std::io::{self, Write};
use tracing::info;

use super::aggregate::AggregateReport;
use crate::error::WsResult;

/// 报告输出器
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// 输出报告，返回写出的JSON文本
    pub fn emit(&mut self, report: &AggregateReport) -> WsResult<String> {
        let json = report.to_pretty_json()?;

        info!("{}", json);
        writeln!(self.out, "{}", json)?;
        self.out.flush()?;

        Ok(json)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
