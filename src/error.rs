// src/error.rs

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("认证失败 (Token 无效或已过期)")]
    TokenInvalid,
    #[error("登录超时，请检查认证 Token 是否有效")]
    SessionExpired,
    #[error("未提供认证 Token，无法访问课程接口")]
    TokenMissing,
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),
    #[error("网络中间件错误: {0}")]
    NetworkMiddleware(#[from] reqwest_middleware::Error),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("无法解析来自 '{url}' 的API响应: {source}")]
    ApiParseFailed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("接口返回错误 (status={status}): {message}")]
    RemoteApi { status: i64, message: String },
    #[error("URL 解析错误: {0}")]
    Url(#[from] url::ParseError),
    #[error("链接中未找到课程 ID: {0}")]
    CourseIdNotFound(String),
    #[error("回放链接中未找到房间 ID 与 token: {0}")]
    LiveLinkInvalid(String),
    #[error("课程 '{0}' 下未找到任何阶段 (gradation)")]
    NoGradation(String),
    #[error("课程 '{course_id}' 的阶段结构不一致: 第 {index} 个阶段与首个阶段类型不同")]
    SchemaMismatch { course_id: String, index: usize },
    #[error("视频 '{video_id}' 没有可用的清晰度")]
    NoStreams { video_id: String },
    #[error("M3U8 解析错误: {0}")]
    M3u8Parse(String),
    #[error("{0}")] // 只打印内部信息，不加任何前缀
    UserInputError(String),
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// 某个分支（阶段、章节、资源）上的失败。
///
/// 遍历过程中这类错误不会中断整个提取，而是随结果一起返回，便于排查。
#[derive(Debug)]
pub struct SoftError {
    pub scope: String,
    pub error: AppError,
}

impl SoftError {
    pub fn new(scope: impl Into<String>, error: AppError) -> Self {
        Self {
            scope: scope.into(),
            error,
        }
    }
}

impl fmt::Display for SoftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.scope, self.error)
    }
}
