// src/extractor/resolver.rs

use super::{gate::RequestGate, harvest::Harvest, locator};
use crate::{
    constants::{
        self,
        api::{discriminators, extensions, mime_types},
    },
    error::*,
    gateway::CourseGateway,
    manifest::ManifestExpander,
    models::{MediaDescriptor, MediaKind, Part, Stream, api::Resource},
    utils,
};
use dashmap::DashMap;
use futures::future::join_all;
use log::{debug, info, trace, warn};
use std::{collections::BTreeMap, path::Path, sync::Arc};
use tokio::sync::OnceCell;

/// 把单条资源记录解析为至多一个媒体描述
pub struct ResourceResolver {
    gateway: Arc<dyn CourseGateway>,
    expander: Arc<dyn ManifestExpander>,
    gate: RequestGate,
    resolution: String,
    channel: u32,
    /// (房间ID, token) -> 视频码，同一回放常出现在多个槽位。
    /// 并发的同键请求共享同一次换取，失败结果同样缓存。
    live_codes: DashMap<(String, String), Arc<OnceCell<Option<String>>>>,
}

impl ResourceResolver {
    pub fn new(
        gateway: Arc<dyn CourseGateway>,
        expander: Arc<dyn ManifestExpander>,
        gate: RequestGate,
        resolution: impl Into<String>,
        channel: u32,
    ) -> Self {
        Self {
            gateway,
            expander,
            gate,
            resolution: resolution.into(),
            channel,
            live_codes: DashMap::new(),
        }
    }

    /// 按资源类型分派。
    ///
    /// 不支持的类型、缺少地址的讲义、无法解析或换取失败的回放都返回 `Ok(None)`；
    /// 视频没有任何可用清晰度时返回 `NoStreams` 错误。
    pub async fn resolve(
        &self,
        resource: &Resource,
        base_dir: &Path,
    ) -> AppResult<Option<MediaDescriptor>> {
        match resource.discriminator.as_str() {
            discriminators::LECTURE_NOTE => Ok(self.map_document(resource, base_dir)),
            discriminators::VIDEO => self
                .map_video(resource, &resource.video_id, base_dir)
                .await
                .map(Some),
            discriminators::LIVE_NEW => {
                let Some(code) = self.exchange_live_code(resource).await else {
                    return Ok(None);
                };
                self.map_video(resource, &code, base_dir).await.map(Some)
            }
            other => {
                trace!("跳过不支持的资源类型 '{}' (资源 {})", other, resource.id);
                Ok(None)
            }
        }
    }

    /// 并发解析一组资源，失败的资源记为分支错误
    pub async fn resolve_many<'a, I>(&self, resources: I, base_dir: &Path) -> Harvest
    where
        I: IntoIterator<Item = &'a Resource>,
    {
        let branches = resources.into_iter().map(move |resource| async move {
            match self.resolve(resource, base_dir).await {
                Ok(Some(media)) => Harvest::from_media(media),
                Ok(None) => Harvest::default(),
                Err(e) => {
                    warn!(
                        "资源 '{}' (id={}) 解析失败: {}",
                        resource.title, resource.id, e
                    );
                    Harvest::from_failure(SoftError::new(
                        format!("资源 '{}' (id={})", resource.title, resource.id),
                        e,
                    ))
                }
            }
        });
        join_all(branches).await.into_iter().collect()
    }

    async fn exchange_live_code(&self, resource: &Resource) -> Option<String> {
        let (room_id, token) = match locator::extract_room_and_token(&resource.live_url_play_back_app) {
            Ok(pair) => pair,
            Err(e) => {
                warn!("资源 '{}' (id={}) 的回放链接无效: {}", resource.title, resource.id, e);
                return None;
            }
        };

        let key = (room_id, token);
        let cell = self.live_codes.entry(key.clone()).or_default().clone();
        if cell.initialized() {
            debug!("房间 '{}' 的视频码缓存命中", key.0);
        }

        let code = cell
            .get_or_init(|| async {
                match self.gate.run(self.gateway.check_live_token(&key.0, &key.1)).await {
                    Ok(code) => {
                        debug!("房间 '{}' 换取到视频码 '{}'", key.0, code);
                        Some(code)
                    }
                    Err(e) => {
                        warn!("房间 '{}' 换取视频码失败: {}", key.0, e);
                        None
                    }
                }
            })
            .await
            .clone();
        if code.is_none() {
            debug!("资源 '{}' (id={}) 没有可用的视频码，跳过", resource.title, resource.id);
        }
        code
    }

    fn map_document(&self, resource: &Resource, base_dir: &Path) -> Option<MediaDescriptor> {
        if resource.path.is_empty() {
            debug!("讲义 '{}' (id={}) 没有下载地址，跳过", resource.title, resource.id);
            return None;
        }

        let ext = if resource.extension.is_empty() {
            extension_for_mime(&resource.mime).to_string()
        } else {
            resource.extension.clone()
        };
        let size = resource.filesize.trim().parse::<u64>().unwrap_or(0);
        let title = display_title(&resource.title, "document", &resource.id);

        let stream = Stream {
            id: resource.id.clone(),
            quality: "Unknown".to_string(),
            size,
            ext: ext.clone(),
            need_mux: false,
            parts: vec![Part {
                url: resource.path.clone(),
                ext,
                size: Some(size),
            }],
        };

        Some(MediaDescriptor {
            site: constants::SITE_NAME.to_string(),
            title: base_dir.join(title),
            kind: MediaKind::Document,
            url: resource.path.clone(),
            streams: BTreeMap::from([(resource.id.clone(), stream)]),
        })
    }

    async fn map_video(
        &self,
        resource: &Resource,
        video_id: &str,
        base_dir: &Path,
    ) -> AppResult<MediaDescriptor> {
        let video = self
            .gate
            .run(self.gateway.video_info(video_id, &self.resolution, self.channel))
            .await?;
        info!(
            "视频信息: id={}, 标题='{}', 时长={}s, 加密={}, 清晰度数={}",
            video_id,
            video.title,
            video.duration,
            video.encrypt,
            video.list.len()
        );

        let headers = self.gateway.headers();
        let headers = &headers;
        let expansions = video
            .list
            .iter()
            .filter(|(label, quality)| {
                if !quality.is_usable() {
                    warn!(
                        "跳过不可用的清晰度 '{}' (available={}, 有地址={})",
                        label,
                        quality.available,
                        !quality.path.is_empty()
                    );
                }
                quality.is_usable()
            })
            .map(move |(label, quality)| async move {
                debug!(
                    "处理清晰度 '{}': 分辨率={}, 大小={}KB, 水印={}",
                    label, quality.resolution.resolution, quality.file_size, quality.is_watermark
                );
                let segments = self
                    .gate
                    .run(self.expander.expand(&quality.path, headers))
                    .await;
                (label, quality, segments)
            });

        let mut streams = BTreeMap::new();
        for (label, quality, segments) in join_all(expansions).await {
            let segments = match segments {
                Ok(segments) => segments,
                Err(e) => {
                    warn!("清晰度 '{}' 的分片清单解析失败: {}", label, e);
                    continue;
                }
            };
            for (i, url) in segments.iter().take(3).enumerate() {
                debug!("TS 分片 #{}: {}", i, url);
            }

            let id = format!("{}_{}", video_id, label);
            let parts = segments
                .into_iter()
                .map(|url| Part {
                    url,
                    ext: extensions::SEGMENT.to_string(),
                    size: None,
                })
                .collect();
            streams.insert(
                id.clone(),
                Stream {
                    id,
                    quality: quality.resolution.resolution.clone(),
                    size: quality.file_size.saturating_mul(1024),
                    ext: extensions::SEGMENT.to_string(),
                    need_mux: false,
                    parts,
                },
            );
        }

        if streams.is_empty() {
            return Err(AppError::NoStreams {
                video_id: video_id.to_string(),
            });
        }

        Ok(MediaDescriptor {
            site: constants::SITE_NAME.to_string(),
            title: base_dir.join(display_title(&resource.title, "video", &resource.id)),
            kind: MediaKind::Video,
            url: format!("gaodun://video/{}", video_id),
            streams,
        })
    }
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        mime_types::PDF => extensions::PDF,
        mime_types::DOC => extensions::DOC,
        mime_types::DOCX => extensions::DOCX,
        _ => extensions::FALLBACK,
    }
}

/// 清理后的标题，为空时用 `<kind>_<id>` 兜底
fn display_title(title: &str, kind: &str, id: &str) -> String {
    let sanitized = utils::sanitize_segment(title);
    if sanitized.is_empty() {
        format!("{}_{}", kind, id)
    } else {
        sanitized
    }
}
