// src/client.rs

use crate::{
    config::AppConfig,
    constants,
    error::*,
    models::api::ApiResponse,
};
use log::{debug, trace};
use md5::{Digest, Md5};
use reqwest::{
    StatusCode,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Clone)]
pub struct RobustClient {
    pub client: ClientWithMiddleware,
    headers: HeaderMap,
    config: Arc<AppConfig>,
}

impl RobustClient {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        let headers = build_default_headers(&config)?;
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(
            reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .default_headers(headers.clone())
                .connect_timeout(config.connect_timeout)
                .timeout(config.timeout)
                .pool_max_idle_per_host(config.max_concurrency * 2)
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self {
            client,
            headers,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 当前请求头（含认证信息），用于分片清单等外部请求
    pub fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    /// 发送 GET 请求并读取响应文本。
    ///
    /// 响应体中出现会话过期标记时，无论 HTTP 状态码如何都返回 `SessionExpired`。
    pub async fn get_text(&self, url: &str, extra_headers: Option<&HeaderMap>) -> AppResult<String> {
        let mut request = self.client.get(url);
        if let Some(extra) = extra_headers {
            request = request.headers(extra.clone());
        }
        let res = request.send().await?;
        let status = res.status();
        let status_error = res.error_for_status_ref().err();
        let body = res.text().await?;
        trace!("GET {} -> {} ({} bytes)", url, status, body.len());

        if body.contains(constants::SESSION_EXPIRED_MARKER) {
            return Err(AppError::SessionExpired);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::TokenInvalid);
        }
        if let Some(e) = status_error {
            return Err(AppError::Network(e));
        }
        Ok(body)
    }

    /// 请求接口并解包 `{status, message, result}` 结构，状态码不符时返回 `RemoteApi` 错误。
    pub async fn fetch_api<T>(
        &self,
        url: &str,
        ok_status: i64,
        extra_headers: Option<&HeaderMap>,
    ) -> AppResult<T>
    where
        T: DeserializeOwned + Default,
    {
        debug!("请求接口: {}", url);
        let body = self.get_text(url, extra_headers).await?;
        let response: ApiResponse<T> =
            serde_json::from_str(&body).map_err(|source| AppError::ApiParseFailed {
                url: url.to_string(),
                source,
            })?;
        if response.status != ok_status {
            return Err(AppError::RemoteApi {
                status: response.status,
                message: response.message,
            });
        }
        Ok(response.result.unwrap_or_default())
    }
}

fn build_default_headers(config: &AppConfig) -> AppResult<HeaderMap> {
    let extend = serde_json::json!({
        "apiConfigVersion": constants::API_VERSION,
        "appStore": "oppo",
        "appVersion": constants::API_VERSION,
        "phoneBrand": "oneplus",
        "appScheme": "gaodunapp",
        "deviceId": generate_device_id(),
        "appChannel": "oppo",
        "appChannelName": "android",
    })
    .to_string();

    let mut headers = HeaderMap::new();
    for (name, value) in [
        ("authentication", config.auth_token.as_str()),
        ("apiversion", constants::API_VERSION),
        ("x-requested-extend", extend.as_str()),
    ] {
        let value = HeaderValue::from_str(value).map_err(|_| {
            AppError::UserInputError(format!("请求头 '{}' 含有非法字符，请检查 Token", name))
        })?;
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(headers)
}

/// 生成 33 位的设备 ID，以 '2' 开头
fn generate_device_id() -> String {
    let seed = format!(
        "{}-{}",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        std::process::id()
    );
    let digest = Md5::digest(seed.as_bytes());
    format!("2{:x}", digest)
}
