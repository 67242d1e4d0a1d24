// src/gateway.rs

use crate::{
    client::RobustClient,
    constants::api::{paths, status},
    error::*,
    models::api::{EpSyllabusResult, Gradation, LiveCheckResult, Syllabus, VideoInfo},
};
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use url::Url;

/// 课程平台接口。提取流程只依赖这个 trait，测试时可替换为内存实现。
#[async_trait]
pub trait CourseGateway: Send + Sync {
    /// g-study 阶段列表（同时用于判断课程结构）
    async fn gstudy_gradations(&self, course_id: &str) -> AppResult<Vec<Gradation>>;
    /// g-study 某阶段的完整章节树
    async fn gstudy_syllabus(&self, course_id: &str, syllabus_id: &str) -> AppResult<Syllabus>;
    /// ep-study 阶段列表
    async fn ep_gradations(&self, course_id: &str) -> AppResult<Vec<Gradation>>;
    /// ep-study 某阶段的章节列表
    async fn ep_syllabus(&self, course_id: &str, syllabus_id: &str) -> AppResult<Vec<Syllabus>>;
    /// 用回放房间 ID 与 token 换取可播放的视频码
    async fn check_live_token(&self, room_id: &str, token: &str) -> AppResult<String>;
    /// 获取视频的各清晰度信息
    async fn video_info(&self, code: &str, resolution: &str, channel: u32) -> AppResult<VideoInfo>;
    /// 当前请求头，分片清单请求需要携带
    fn headers(&self) -> HeaderMap;
}

pub struct GaodunApi {
    http_client: Arc<RobustClient>,
    vod_headers: HeaderMap,
}

impl GaodunApi {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        let mut vod_headers = HeaderMap::new();
        vod_headers.insert(
            HeaderName::from_static("islivevodauthenticate"),
            HeaderValue::from_static("true"),
        );
        Self {
            http_client,
            vod_headers,
        }
    }

    fn study_url(&self, template: &str, course_id: &str, syllabus_id: Option<&str>) -> String {
        let mut params = vec![("course_id", course_id)];
        if let Some(id) = syllabus_id {
            params.push(("syllabus_id", id));
        }
        self.http_client.config().api_url(template, &params)
    }

    fn vod_url(&self, path: &str, query: &[(&str, &str)]) -> AppResult<String> {
        let base = self.http_client.config().api_url(path, &[]);
        let url = Url::parse_with_params(&base, query)?;
        Ok(url.into())
    }
}

#[async_trait]
impl CourseGateway for GaodunApi {
    async fn gstudy_gradations(&self, course_id: &str) -> AppResult<Vec<Gradation>> {
        let url = self.study_url(paths::GSTUDY_GRADATIONS, course_id, None);
        self.http_client.fetch_api(&url, status::STUDY_OK, None).await
    }

    async fn gstudy_syllabus(&self, course_id: &str, syllabus_id: &str) -> AppResult<Syllabus> {
        let url = self.study_url(paths::GSTUDY_SYLLABUS, course_id, Some(syllabus_id));
        self.http_client.fetch_api(&url, status::STUDY_OK, None).await
    }

    async fn ep_gradations(&self, course_id: &str) -> AppResult<Vec<Gradation>> {
        let url = self.study_url(paths::EP_GRADATIONS, course_id, None);
        self.http_client.fetch_api(&url, status::STUDY_OK, None).await
    }

    async fn ep_syllabus(&self, course_id: &str, syllabus_id: &str) -> AppResult<Vec<Syllabus>> {
        let url = self.study_url(paths::EP_SYLLABUS, course_id, Some(syllabus_id));
        let result: EpSyllabusResult = self
            .http_client
            .fetch_api(&url, status::STUDY_OK, None)
            .await?;
        debug!(
            "ep-study 阶段 '{}' 返回 {} 个章节",
            syllabus_id,
            result.items.len()
        );
        Ok(result.items)
    }

    async fn check_live_token(&self, room_id: &str, token: &str) -> AppResult<String> {
        let url = self.vod_url(paths::LIVE_CHECK, &[("roomId", room_id), ("token", token)])?;
        let result: LiveCheckResult = self
            .http_client
            .fetch_api(&url, status::VOD_OK, Some(&self.vod_headers))
            .await?;
        if result.code.is_empty() {
            return Err(AppError::RemoteApi {
                status: status::VOD_OK,
                message: format!("房间 '{}' 未返回视频码", room_id),
            });
        }
        Ok(result.code)
    }

    async fn video_info(&self, code: &str, resolution: &str, channel: u32) -> AppResult<VideoInfo> {
        let channel = channel.to_string();
        let url = self.vod_url(
            paths::LIVE_RESOURCE,
            &[("code", code), ("res", resolution), ("channel", channel.as_str())],
        )?;
        self.http_client
            .fetch_api(&url, status::VOD_OK, Some(&self.vod_headers))
            .await
    }

    fn headers(&self) -> HeaderMap {
        self.http_client.headers()
    }
}
