// src/models/mod.rs

pub mod api;

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, path::PathBuf};

/// 课程所属的两种接口结构
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CourseSchema {
    /// g-study：阶段下挂一棵 glive 章节树，章节带四个资源槽位
    GStudy,
    /// ep-study：阶段下是章节列表，节点以 isResource 标记资源
    EpStudy,
}

impl fmt::Display for CourseSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseSchema::GStudy => write!(f, "g-study"),
            CourseSchema::EpStudy => write!(f, "ep-study"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Document,
}

/// 一个可下载单元：完整文件或视频的一个分片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub url: String,
    pub ext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// 媒体的一种清晰度/版本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub quality: String,
    pub size: u64,
    pub ext: String,
    pub need_mux: bool,
    pub parts: Vec<Part>,
}

/// 提取结果的输出单元
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub site: String,
    /// 目标路径：课程ID/阶段/章节/标题
    pub title: PathBuf,
    pub kind: MediaKind,
    pub url: String,
    pub streams: BTreeMap<String, Stream>,
}

impl MediaDescriptor {
    /// 所有清晰度的下载单元总数
    pub fn total_parts(&self) -> usize {
        self.streams.values().map(|s| s.parts.len()).sum()
    }
}
