// src/extractor/mod.rs

pub mod classifier;
pub mod epstudy;
pub mod gate;
pub mod gstudy;
pub mod harvest;
pub mod locator;
pub mod resolver;

use crate::{
    client::RobustClient,
    config::AppConfig,
    error::*,
    gateway::{CourseGateway, GaodunApi},
    manifest::{M3u8Expander, ManifestExpander},
    models::{CourseSchema, MediaDescriptor},
    utils,
};
use epstudy::EpStudyWalker;
use gate::RequestGate;
use gstudy::GStudyWalker;
use log::{debug, info, warn};
use resolver::ResourceResolver;
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};

/// 章节节点的输出目录：课程ID/阶段/章节
pub(crate) fn node_dir(course_id: &str, gradation_name: &str, syllabus_name: &str) -> PathBuf {
    PathBuf::from(course_id)
        .join(utils::sanitize_segment(gradation_name))
        .join(utils::sanitize_segment(syllabus_name))
}

/// 一门课程的提取结果
#[derive(Debug, Serialize)]
pub struct Extraction {
    pub course_id: String,
    pub schema: CourseSchema,
    pub media: Vec<MediaDescriptor>,
    #[serde(skip)]
    pub failures: Vec<SoftError>,
}

pub struct CourseExtractor {
    gateway: Arc<dyn CourseGateway>,
    expander: Arc<dyn ManifestExpander>,
    gate: RequestGate,
    resolution: String,
    channel: u32,
    strict_schema: bool,
}

impl CourseExtractor {
    pub fn new(
        gateway: Arc<dyn CourseGateway>,
        expander: Arc<dyn ManifestExpander>,
        config: &AppConfig,
    ) -> Self {
        Self {
            gateway,
            expander,
            gate: RequestGate::new(config.max_concurrency),
            resolution: config.resolution.clone(),
            channel: config.channel,
            strict_schema: false,
        }
    }

    /// 使用真实接口与 M3U8 展开器构建
    pub fn from_client(http_client: Arc<RobustClient>) -> Self {
        let gateway: Arc<dyn CourseGateway> = Arc::new(GaodunApi::new(http_client.clone()));
        let expander: Arc<dyn ManifestExpander> = Arc::new(M3u8Expander::new(http_client.clone()));
        Self::new(gateway, expander, http_client.config())
    }

    pub fn with_strict_schema(mut self, strict: bool) -> Self {
        self.strict_schema = strict;
        self
    }

    pub async fn extract(&self, url: &str) -> AppResult<Extraction> {
        let course_id = locator::extract_course_id(url)?;
        debug!("从链接 '{}' 解析出课程 ID: {}", url, course_id);
        self.extract_course(&course_id).await
    }

    /// 提取一门课程。回放视频码缓存只在本次调用内有效。
    pub async fn extract_course(&self, course_id: &str) -> AppResult<Extraction> {
        let resolver = Arc::new(ResourceResolver::new(
            self.gateway.clone(),
            self.expander.clone(),
            self.gate.clone(),
            self.resolution.clone(),
            self.channel,
        ));
        let classification =
            classifier::classify_schema(self.gateway.as_ref(), &self.gate, course_id, self.strict_schema)
                .await?;

        let harvest = match classification.schema {
            CourseSchema::GStudy => {
                GStudyWalker::new(
                    self.gateway.clone(),
                    resolver.clone(),
                    self.gate.clone(),
                    course_id,
                )
                .walk_gradations(&classification.gradations)
                .await
            }
            CourseSchema::EpStudy => {
                EpStudyWalker::new(
                    self.gateway.clone(),
                    resolver,
                    self.gate.clone(),
                    course_id,
                )
                .walk()
                .await?
            }
        };

        if !harvest.failures.is_empty() {
            warn!(
                "课程 '{}' 有 {} 个分支提取失败",
                course_id,
                harvest.failures.len()
            );
        }
        info!(
            "课程 '{}' ({}) 提取完成: {} 个媒体",
            course_id,
            classification.schema,
            harvest.len()
        );

        Ok(Extraction {
            course_id: course_id.to_string(),
            schema: classification.schema,
            media: harvest.media,
            failures: harvest.failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_node_dir_sanitizes_each_segment() {
        assert_eq!(
            node_dir("123", "阶段: 一", "第1章/总论"),
            Path::new("123").join("阶段- 一").join("第1章-总论")
        );
    }
}
