//! 全局错误类型定义

use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WappscanError {
    // 输入相关错误
    #[error("无法读取URL列表文件 {path}：{source}")]
    InputError {
        path: String,
        #[source]
        source: IoError,
    },

    // 规则相关错误
    #[error("规则加载失败：{0}")]
    RuleLoadError(String),
    #[error("规则缓存失败：{0}")]
    RuleCacheError(String),
    #[error("规则解析失败：{0}")]
    RuleParseError(String),

    // 编译相关错误
    #[error("正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),

    // 检测相关错误
    #[error("指纹引擎初始化失败：{0}")]
    EngineInitError(String),

    // 网络相关错误
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),

    // 序列化/反序列化错误
    #[error("JSON序列化/解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("MessagePack序列化/反序列化失败：{0}")]
    MsgPackError(String),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
}

// 全局Result类型
pub type WsResult<T> = Result<T, WappscanError>;
