// src/manifest.rs

use crate::{client::RobustClient, error::*};
use async_trait::async_trait;
use log::debug;
use m3u8_rs::Playlist;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use url::Url;

/// 把分片清单地址展开为有序的分片地址列表
#[async_trait]
pub trait ManifestExpander: Send + Sync {
    async fn expand(&self, manifest_url: &str, headers: &HeaderMap) -> AppResult<Vec<String>>;
}

pub struct M3u8Expander {
    http_client: Arc<RobustClient>,
}

impl M3u8Expander {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        Self { http_client }
    }

    async fn fetch_playlist(&self, url: &Url, headers: &HeaderMap) -> AppResult<Playlist> {
        let text = self.http_client.get_text(url.as_str(), Some(headers)).await?;
        m3u8_rs::parse_playlist_res(text.as_bytes())
            .map_err(|e| AppError::M3u8Parse(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl ManifestExpander for M3u8Expander {
    async fn expand(&self, manifest_url: &str, headers: &HeaderMap) -> AppResult<Vec<String>> {
        let mut url = Url::parse(manifest_url)?;
        let mut playlist = self.fetch_playlist(&url, headers).await?;

        // 主播放列表只跟随一层，选择码率最高的子列表
        if let Playlist::MasterPlaylist(master) = &playlist {
            let variant = master
                .variants
                .iter()
                .filter(|v| !v.is_i_frame)
                .max_by_key(|v| v.bandwidth)
                .ok_or_else(|| AppError::M3u8Parse(format!("主播放列表不含子列表: {}", url)))?;
            url = url.join(&variant.uri)?;
            debug!("主播放列表指向子列表: {}", url);
            playlist = self.fetch_playlist(&url, headers).await?;
        }

        let Playlist::MediaPlaylist(media) = playlist else {
            return Err(AppError::M3u8Parse(format!("预期的M3U8文件不是媒体播放列表: {}", url)));
        };
        if media.segments.is_empty() {
            return Err(AppError::M3u8Parse(format!("M3U8文件不含分片: {}", url)));
        }

        media
            .segments
            .iter()
            .map(|segment| Ok(url.join(&segment.uri)?.to_string()))
            .collect()
    }
}
