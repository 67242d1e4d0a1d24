// src/extractor/gstudy.rs

use super::{gate::RequestGate, harvest::Harvest, node_dir, resolver::ResourceResolver};
use crate::{
    error::*,
    gateway::CourseGateway,
    models::api::{Gradation, Syllabus},
};
use futures::future::{BoxFuture, FutureExt, join_all};
use log::{debug, info, trace, warn};
use std::sync::Arc;

/// g-study 课程的章节树遍历
pub struct GStudyWalker {
    gateway: Arc<dyn CourseGateway>,
    resolver: Arc<ResourceResolver>,
    gate: RequestGate,
    course_id: String,
}

impl GStudyWalker {
    pub fn new(
        gateway: Arc<dyn CourseGateway>,
        resolver: Arc<ResourceResolver>,
        gate: RequestGate,
        course_id: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            resolver,
            gate,
            course_id: course_id.into(),
        }
    }

    /// 遍历已获取的阶段列表，各阶段并发进行
    pub async fn walk_gradations(&self, gradations: &[Gradation]) -> Harvest {
        info!(
            "开始遍历 g-study 课程 '{}'，共 {} 个阶段",
            self.course_id,
            gradations.len()
        );
        join_all(gradations.iter().map(|g| self.walk_gradation(g)))
            .await
            .into_iter()
            .collect()
    }

    async fn walk_gradation(&self, gradation: &Gradation) -> Harvest {
        if gradation.glive_syllabus.is_none() {
            debug!("阶段 '{}' 没有章节根节点，跳过", gradation.name);
            return Harvest::default();
        }

        let syllabus = self
            .gate
            .run(
                self.gateway
                    .gstudy_syllabus(&self.course_id, &gradation.syllabus_id),
            )
            .await;

        match syllabus {
            Ok(root) => {
                let harvest = self.walk_syllabus(&gradation.name, &root).await;
                debug!(
                    "阶段 '{}' 提取到 {} 个媒体",
                    gradation.name,
                    harvest.len()
                );
                harvest
            }
            Err(e) => {
                warn!(
                    "获取 g-study 章节失败: 课程={}, 阶段='{}', 错误: {}",
                    self.course_id, gradation.name, e
                );
                Harvest::from_failure(SoftError::new(
                    format!("阶段 '{}' (syllabus={})", gradation.name, gradation.syllabus_id),
                    e,
                ))
            }
        }
    }

    /// 先并发遍历子章节，同时并发解析本节点的四个资源槽位；子章节结果排在前面。
    fn walk_syllabus<'a>(
        &'a self,
        gradation_name: &'a str,
        node: &'a Syllabus,
    ) -> BoxFuture<'a, Harvest> {
        async move {
            let dir = node_dir(&self.course_id, gradation_name, &node.name);
            let dir = &dir;

            let children = join_all(
                node.children
                    .iter()
                    .map(|child| self.walk_syllabus(gradation_name, child)),
            );
            let slots = join_all(
                node.slots()
                    .into_iter()
                    .filter(|(_, resources)| !resources.is_empty())
                    .map(move |(slot, resources)| async move {
                        trace!(
                            "章节 '{}' 的{}资源: {} 个",
                            node.name,
                            slot.label(),
                            resources.len()
                        );
                        self.resolver.resolve_many(resources, dir).await
                    }),
            );

            let (children, slots) = futures::join!(children, slots);
            children.into_iter().chain(slots).collect()
        }
        .boxed()
    }
}
