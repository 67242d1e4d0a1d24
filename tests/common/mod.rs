// tests/common/mod.rs

#![allow(dead_code)]

use async_trait::async_trait;
use gaodun_dl::{
    config::AppConfig,
    error::{AppError, AppResult},
    extractor::CourseExtractor,
    gateway::CourseGateway,
    manifest::ManifestExpander,
    models::api::{Gradation, Resource, ResolutionInfo, Syllabus, VideoInfo, VideoQuality},
};
use reqwest::header::HeaderMap;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

/// 内存中的课程接口，记录调用次数与同时在途的请求峰值
#[derive(Default)]
pub struct MockGateway {
    pub gradations: Vec<Gradation>,
    pub fail_gradations: bool,
    pub gstudy_syllabi: HashMap<String, Syllabus>,
    pub ep_gradations: Vec<Gradation>,
    pub ep_syllabi: HashMap<String, Vec<Syllabus>>,
    pub live_codes: HashMap<(String, String), String>,
    pub videos: HashMap<String, VideoInfo>,
    pub delay: Option<Duration>,
    pub in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub live_checks: AtomicUsize,
}

impl MockGateway {
    async fn track<T>(&self, reply: impl FnOnce() -> AppResult<T>) -> AppResult<T> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = reply();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn live_checks(&self) -> usize {
        self.live_checks.load(Ordering::SeqCst)
    }
}

fn not_found(what: &str) -> AppError {
    AppError::RemoteApi {
        status: 404,
        message: format!("{} 不存在", what),
    }
}

#[async_trait]
impl CourseGateway for MockGateway {
    async fn gstudy_gradations(&self, _course_id: &str) -> AppResult<Vec<Gradation>> {
        self.track(|| {
            if self.fail_gradations {
                Err(AppError::SessionExpired)
            } else {
                Ok(self.gradations.clone())
            }
        })
        .await
    }

    async fn gstudy_syllabus(&self, _course_id: &str, syllabus_id: &str) -> AppResult<Syllabus> {
        self.track(|| {
            self.gstudy_syllabi
                .get(syllabus_id)
                .cloned()
                .ok_or_else(|| not_found(syllabus_id))
        })
        .await
    }

    async fn ep_gradations(&self, _course_id: &str) -> AppResult<Vec<Gradation>> {
        self.track(|| Ok(self.ep_gradations.clone())).await
    }

    async fn ep_syllabus(&self, _course_id: &str, syllabus_id: &str) -> AppResult<Vec<Syllabus>> {
        self.track(|| {
            self.ep_syllabi
                .get(syllabus_id)
                .cloned()
                .ok_or_else(|| not_found(syllabus_id))
        })
        .await
    }

    async fn check_live_token(&self, room_id: &str, token: &str) -> AppResult<String> {
        self.live_checks.fetch_add(1, Ordering::SeqCst);
        self.track(|| {
            self.live_codes
                .get(&(room_id.to_string(), token.to_string()))
                .cloned()
                .ok_or(AppError::TokenInvalid)
        })
        .await
    }

    async fn video_info(&self, code: &str, _resolution: &str, _channel: u32) -> AppResult<VideoInfo> {
        self.track(|| self.videos.get(code).cloned().ok_or_else(|| not_found(code)))
            .await
    }

    fn headers(&self) -> HeaderMap {
        HeaderMap::new()
    }
}

/// 清单地址 -> 分片列表；未登记的地址视为解析失败
#[derive(Default)]
pub struct MockExpander {
    pub manifests: HashMap<String, Vec<String>>,
}

#[async_trait]
impl ManifestExpander for MockExpander {
    async fn expand(&self, manifest_url: &str, _headers: &HeaderMap) -> AppResult<Vec<String>> {
        self.manifests
            .get(manifest_url)
            .cloned()
            .ok_or_else(|| AppError::M3u8Parse(format!("未知清单: {}", manifest_url)))
    }
}

pub fn extractor(gateway: Arc<MockGateway>, expander: MockExpander, max_concurrency: usize) -> CourseExtractor {
    let config = AppConfig {
        max_concurrency,
        ..AppConfig::default()
    };
    CourseExtractor::new(gateway, Arc::new(expander), &config)
}

// --- 数据构造 ---

pub fn gstudy_gradation(name: &str, syllabus_id: &str) -> Gradation {
    Gradation {
        name: name.into(),
        syllabus_id: syllabus_id.into(),
        glive_syllabus: Some(Box::new(Syllabus::default())),
        ..Default::default()
    }
}

pub fn ep_gradation(id: &str, name: &str) -> Gradation {
    Gradation {
        id: id.into(),
        name: name.into(),
        ep_syllabus: Some(vec![]),
        ..Default::default()
    }
}

pub fn node(name: &str) -> Syllabus {
    Syllabus {
        name: name.into(),
        ..Default::default()
    }
}

pub fn video(id: &str, title: &str, video_id: &str) -> Resource {
    Resource {
        id: id.into(),
        title: title.into(),
        discriminator: "video".into(),
        video_id: video_id.into(),
        ..Default::default()
    }
}

pub fn note(id: &str, title: &str, path: &str) -> Resource {
    Resource {
        id: id.into(),
        title: title.into(),
        discriminator: "lecture_note".into(),
        path: path.into(),
        mime: "application/pdf".into(),
        filesize: "2048".into(),
        ..Default::default()
    }
}

pub fn live(id: &str, title: &str, link: &str) -> Resource {
    Resource {
        id: id.into(),
        title: title.into(),
        discriminator: "live_new".into(),
        live_url_play_back_app: link.into(),
        ..Default::default()
    }
}

pub fn quality(path: &str, available: u64, resolution: &str) -> VideoQuality {
    VideoQuality {
        available,
        file_size: 100,
        path: path.into(),
        resolution: ResolutionInfo {
            resolution: resolution.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn video_info(title: &str, qualities: Vec<(&str, VideoQuality)>) -> VideoInfo {
    VideoInfo {
        title: title.into(),
        duration: 600,
        list: qualities
            .into_iter()
            .map(|(label, q)| (label.to_string(), q))
            .collect::<BTreeMap<_, _>>(),
        ..Default::default()
    }
}

/// 登记一个单清晰度的可用视频及其分片
pub fn register_video(gateway: &mut MockGateway, expander: &mut MockExpander, video_id: &str) {
    let manifest = format!("https://cdn.example.com/{}/index.m3u8", video_id);
    gateway.videos.insert(
        video_id.to_string(),
        video_info(video_id, vec![("SD", quality(&manifest, 1, "640x360"))]),
    );
    expander.manifests.insert(
        manifest,
        vec![
            format!("https://cdn.example.com/{}/0.ts", video_id),
            format!("https://cdn.example.com/{}/1.ts", video_id),
        ],
    );
}
