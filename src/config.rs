// src/config.rs

pub mod token;

use self::token::load_or_create_external_config;
use crate::{cli::Cli, constants, error::AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub api_endpoint: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractionConfig {
    pub max_concurrency: Option<usize>,
    pub resolution: Option<String>,
    pub channel: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authtoken: Option<String>,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        // 为网络与解析提供一组稳健的默认值
        Self {
            authtoken: None,
            network: NetworkConfig {
                api_endpoint: Some(constants::api::DEFAULT_ENDPOINT.into()),
                connect_timeout_secs: Some(10),
                timeout_secs: Some(60),
                max_retries: Some(3),
            },
            extraction: ExtractionConfig {
                max_concurrency: Some(constants::DEFAULT_MAX_CONCURRENCY),
                resolution: Some(constants::api::DEFAULT_RESOLUTION.into()),
                channel: Some(constants::api::DEFAULT_CHANNEL),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_endpoint: String,
    pub auth_token: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_concurrency: usize,
    pub resolution: String,
    pub channel: u32,
}

impl AppConfig {
    pub fn new(args: &Cli) -> AppResult<Self> {
        let external_config = load_or_create_external_config()?;
        let (token, source) =
            token::resolve_token(args.token.as_deref(), external_config.authtoken.as_deref());
        log::info!("认证 Token 来源: {}", source);
        Ok(Self::from_external(
            external_config,
            token.unwrap_or_default(),
            args.workers,
        ))
    }

    pub(crate) fn from_external(
        external_config: ExternalConfig,
        auth_token: String,
        workers: Option<usize>,
    ) -> Self {
        let network = external_config.network;
        let extraction = external_config.extraction;
        Self {
            api_endpoint: network
                .api_endpoint
                .unwrap_or_else(|| constants::api::DEFAULT_ENDPOINT.into())
                .trim_end_matches('/')
                .to_string(),
            auth_token,
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(network.connect_timeout_secs.unwrap_or(10)),
            timeout: Duration::from_secs(network.timeout_secs.unwrap_or(60)),
            max_retries: network.max_retries.unwrap_or(3),
            max_concurrency: workers
                .or(extraction.max_concurrency)
                .unwrap_or(constants::DEFAULT_MAX_CONCURRENCY)
                .max(1),
            resolution: extraction
                .resolution
                .unwrap_or_else(|| constants::api::DEFAULT_RESOLUTION.into()),
            channel: extraction.channel.unwrap_or(constants::api::DEFAULT_CHANNEL),
        }
    }

    /// 用路径模板拼出完整的接口地址
    pub fn api_url(&self, path_template: &str, params: &[(&str, &str)]) -> String {
        let mut path = path_template.to_string();
        for (key, val) in params {
            path = path.replace(&format!("{{{}}}", key), val);
        }
        format!("{}{}", self.api_endpoint, path)
    }
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_endpoint: constants::api::DEFAULT_ENDPOINT.to_string(),
            auth_token: "test-token".to_string(),
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            max_retries: 0,
            max_concurrency: 4,
            resolution: constants::api::DEFAULT_RESOLUTION.to_string(),
            channel: constants::api::DEFAULT_CHANNEL,
        }
    }
}
