//! 目标站点HTTP客户端构建

use reqwest::Client;
use tracing::debug;

use crate::config::ScanConfig;
use crate::error::WsResult;

/// 按配置构建扫描用HTTP客户端
///
/// 默认不校验TLS证书（自签名、过期证书照常抓取），`strict_tls` 开启后恢复校验。
/// `http_timeout` 为 0 时不设置请求超时。
pub fn build_http_client(config: &ScanConfig) -> WsResult<Client> {
    let mut builder = Client::builder()
        .danger_accept_invalid_certs(!config.strict_tls)
        .user_agent(config.user_agent.as_str());

    if config.http_timeout > 0 {
        builder = builder.timeout(config.request_timeout());
    }

    debug!(
        "HTTP客户端配置：超时={}s，校验证书={}，User-Agent={}",
        config.http_timeout, config.strict_tls, config.user_agent
    );

    Ok(builder.build()?)
}
