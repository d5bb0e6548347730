//! 抓取与指纹识别：单个URL抓取后交给指纹引擎，失败时返回空结果

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::engine::Fingerprinter;

/// 单个URL的扫描结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub url: String,
    pub technologies: Vec<String>,
}

impl ScanResult {
    /// 抓取失败时的结果：保留URL，技术列表为空
    pub fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            technologies: Vec::new(),
        }
    }
}

/// 扫描器：持有共享的HTTP客户端与指纹引擎
#[derive(Clone)]
pub struct Scanner {
    client: Client,
    engine: Arc<dyn Fingerprinter>,
    concurrency: usize,
}

impl Scanner {
    pub fn new(client: Client, engine: Arc<dyn Fingerprinter>) -> Self {
        Self {
            client,
            engine,
            concurrency: 1,
        }
    }

    /// 同时进行的扫描数，1 为串行
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// 扫描单个URL
    ///
    /// 任何HTTP响应（含4xx/5xx）都会参与识别；只有连接、DNS、超时等传输层错误返回空结果。
    /// 响应体读取中途出错时，使用已读到的部分继续识别。
    pub async fn scan(&self, url: &str) -> ScanResult {
        let mut response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("抓取 {} 失败：{}", url, e);
                return ScanResult::empty(url);
            }
        };

        let status = response.status();
        let headers = response.headers().clone();

        let mut body = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => body.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => {
                    warn!("读取 {} 响应体失败（已读取{}字节）：{}", url, body.len(), e);
                    break;
                }
            }
        }
        drop(response);

        let mut technologies: Vec<String> = self.engine.fingerprint(&headers, &body).into_iter().collect();
        technologies.sort();

        debug!("{} 状态码={}，响应体{}字节，识别到{}项技术", url, status, body.len(), technologies.len());

        ScanResult {
            url: url.to_string(),
            technologies,
        }
    }

    /// 扫描URL列表，结果顺序与输入顺序一致
    pub async fn scan_all(&self, urls: &[String]) -> Vec<ScanResult> {
        info!("开始扫描，目标数：{}，并发数：{}", urls.len(), self.concurrency);

        stream::iter(urls)
            .map(|url| self.scan(url))
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
