// src/extractor/epstudy.rs

use super::{gate::RequestGate, harvest::Harvest, node_dir, resolver::ResourceResolver};
use crate::{
    error::*,
    gateway::CourseGateway,
    models::api::{Gradation, Syllabus},
};
use futures::future::{BoxFuture, FutureExt, join_all};
use log::{debug, info, warn};
use std::sync::Arc;

/// ep-study 中被标记为资源的章节节点的映射方式：
/// 节点自身携带的资源槽位交给通用解析器，落在该节点的目录下。
pub struct EpResourceMapper {
    resolver: Arc<ResourceResolver>,
    course_id: String,
}

impl EpResourceMapper {
    pub fn new(resolver: Arc<ResourceResolver>, course_id: impl Into<String>) -> Self {
        Self {
            resolver,
            course_id: course_id.into(),
        }
    }

    pub async fn map(&self, gradation_name: &str, node: &Syllabus) -> Harvest {
        let slots = node.slots();
        let resources: Vec<_> = slots.iter().flat_map(|(_, r)| r.iter()).collect();
        if resources.is_empty() {
            debug!("ep-study 资源节点 '{}' (id={}) 未携带资源记录", node.name, node.id);
            return Harvest::default();
        }
        let dir = node_dir(&self.course_id, gradation_name, &node.name);
        self.resolver.resolve_many(resources, &dir).await
    }
}

/// ep-study 课程的章节列表遍历
pub struct EpStudyWalker {
    gateway: Arc<dyn CourseGateway>,
    mapper: EpResourceMapper,
    gate: RequestGate,
    course_id: String,
}

impl EpStudyWalker {
    pub fn new(
        gateway: Arc<dyn CourseGateway>,
        resolver: Arc<ResourceResolver>,
        gate: RequestGate,
        course_id: impl Into<String>,
    ) -> Self {
        let course_id = course_id.into();
        Self {
            gateway,
            mapper: EpResourceMapper::new(resolver, course_id.clone()),
            gate,
            course_id,
        }
    }

    /// 拉取 ep-study 阶段列表后遍历。阶段列表本身获取失败会直接返回错误。
    pub async fn walk(&self) -> AppResult<Harvest> {
        let gradations = self
            .gate
            .run(self.gateway.ep_gradations(&self.course_id))
            .await?;
        info!(
            "开始遍历 ep-study 课程 '{}'，共 {} 个阶段",
            self.course_id,
            gradations.len()
        );
        Ok(join_all(gradations.iter().map(|g| self.walk_gradation(g)))
            .await
            .into_iter()
            .collect())
    }

    async fn walk_gradation(&self, gradation: &Gradation) -> Harvest {
        if gradation.id.is_empty() {
            debug!("阶段 '{}' 没有 ID，跳过", gradation.name);
            return Harvest::default();
        }

        let items = self
            .gate
            .run(self.gateway.ep_syllabus(&self.course_id, &gradation.id))
            .await;
        match items {
            Ok(items) => self.walk_items(&gradation.name, &items).await,
            Err(e) => {
                warn!(
                    "获取 ep-study 章节失败: 课程={}, 阶段='{}', 错误: {}",
                    self.course_id, gradation.name, e
                );
                Harvest::from_failure(SoftError::new(
                    format!("阶段 '{}' (id={})", gradation.name, gradation.id),
                    e,
                ))
            }
        }
    }

    fn walk_items<'a>(&'a self, gradation_name: &'a str, items: &'a [Syllabus]) -> BoxFuture<'a, Harvest> {
        async move {
            join_all(items.iter().map(|item| self.walk_item(gradation_name, item)))
                .await
                .into_iter()
                .collect()
        }
        .boxed()
    }

    /// 子章节与节点自身的资源相互独立，并发处理
    async fn walk_item(&self, gradation_name: &str, item: &Syllabus) -> Harvest {
        let children = async {
            if item.children.is_empty() {
                Harvest::default()
            } else {
                self.walk_items(gradation_name, &item.children).await
            }
        };
        let own = async {
            if item.is_resource {
                self.mapper.map(gradation_name, item).await
            } else {
                Harvest::default()
            }
        };
        let (children, own) = futures::join!(children, own);
        [children, own].into_iter().collect()
    }
}
