// src/extractor/classifier.rs

use super::gate::RequestGate;
use crate::{
    error::*,
    gateway::CourseGateway,
    models::{CourseSchema, api::Gradation},
};
use log::{debug, info};

/// 结构判定结果，附带用于判定的 g-study 阶段列表，g-study 课程可直接复用
#[derive(Debug)]
pub struct Classification {
    pub schema: CourseSchema,
    pub gradations: Vec<Gradation>,
}

fn schema_of(gradation: &Gradation) -> CourseSchema {
    if gradation.has_gstudy_shape() {
        CourseSchema::GStudy
    } else {
        CourseSchema::EpStudy
    }
}

/// 只看第一个阶段判定课程结构
pub fn classify_gradations(course_id: &str, gradations: &[Gradation]) -> AppResult<CourseSchema> {
    let first = gradations
        .first()
        .ok_or_else(|| AppError::NoGradation(course_id.to_string()))?;
    Ok(schema_of(first))
}

/// 逐个检查所有阶段，任何一个与首个阶段结构不同即报错
pub fn classify_gradations_strict(
    course_id: &str,
    gradations: &[Gradation],
) -> AppResult<CourseSchema> {
    let schema = classify_gradations(course_id, gradations)?;
    if let Some(index) = gradations.iter().position(|g| schema_of(g) != schema) {
        return Err(AppError::SchemaMismatch {
            course_id: course_id.to_string(),
            index,
        });
    }
    Ok(schema)
}

pub async fn classify_schema(
    gateway: &dyn CourseGateway,
    gate: &RequestGate,
    course_id: &str,
    strict: bool,
) -> AppResult<Classification> {
    let gradations = gate.run(gateway.gstudy_gradations(course_id)).await?;
    debug!("课程 '{}' 返回 {} 个 g-study 阶段", course_id, gradations.len());

    let schema = if strict {
        classify_gradations_strict(course_id, &gradations)?
    } else {
        classify_gradations(course_id, &gradations)?
    };
    info!("课程 '{}' 判定为 {} 结构", course_id, schema);
    Ok(Classification { schema, gradations })
}
