// src/models/api.rs

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

// --- 反序列化辅助函数 ---

/// 接受字符串或数字形式的标识符，统一转为字符串；`null` 视为空。
fn flex_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// `isResource` 之类的标记位，可能是 0/1、"0"/"1" 或布尔值。
fn flex_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().is_some_and(|v| v != 0),
        Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
        _ => false,
    })
}

fn flex_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// 把 `null` 当作缺省值处理（接口对空列表时常返回 null）
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 返回候选值中第一个非空的字符串
pub(crate) fn first_non_empty<const N: usize>(candidates: [String; N]) -> String {
    candidates
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

// --- 通用响应包装 ---

#[derive(Deserialize, Debug)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status: i64,
    #[serde(default, deserialize_with = "flex_string")]
    pub message: String,
    pub result: Option<T>,
}

// --- 阶段 (Gradation) ---

/// 接口原始结构：同一个标识可能以驼峰或下划线两种字段名出现。
#[derive(Deserialize)]
struct RawGradation {
    #[serde(default, deserialize_with = "flex_string")]
    id: String,
    #[serde(default, deserialize_with = "flex_string")]
    name: String,
    #[serde(default, deserialize_with = "flex_string")]
    description: String,
    #[serde(default, rename = "syllabusId", deserialize_with = "flex_string")]
    syllabus_id_camel: String,
    #[serde(default, rename = "syllabus_id", deserialize_with = "flex_string")]
    syllabus_id_snake: String,
    #[serde(default, rename = "courseId", deserialize_with = "flex_string")]
    course_id_camel: String,
    #[serde(default, rename = "course_id", deserialize_with = "flex_string")]
    course_id_snake: String,
    #[serde(default, deserialize_with = "nullable")]
    children: Vec<Gradation>,
    #[serde(default, rename = "gliveSyllabus")]
    glive_syllabus: Option<Syllabus>,
    #[serde(default, rename = "epSyllabus")]
    ep_syllabus: Option<Vec<Syllabus>>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(from = "RawGradation")]
pub struct Gradation {
    pub id: String,
    pub name: String,
    pub description: String,
    pub syllabus_id: String,
    pub course_id: String,
    pub children: Vec<Gradation>,
    /// g-study 课程的章节根节点
    pub glive_syllabus: Option<Box<Syllabus>>,
    /// ep-study 课程的章节列表（存在即表示 ep-study 结构，哪怕为空）
    pub ep_syllabus: Option<Vec<Syllabus>>,
}

impl From<RawGradation> for Gradation {
    fn from(raw: RawGradation) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            syllabus_id: first_non_empty([raw.syllabus_id_camel, raw.syllabus_id_snake]),
            course_id: first_non_empty([raw.course_id_camel, raw.course_id_snake]),
            children: raw.children,
            glive_syllabus: raw.glive_syllabus.map(Box::new),
            ep_syllabus: raw.ep_syllabus,
        }
    }
}

impl Gradation {
    /// 是否呈现 g-study 结构：带有章节根节点且没有 ep-study 列表
    pub fn has_gstudy_shape(&self) -> bool {
        self.glive_syllabus.is_some() && self.ep_syllabus.is_none()
    }
}

// --- 章节 (Syllabus) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceSlot {
    PreClass,
    InClassMain,
    InClassAssist,
    AfterClass,
}

impl ResourceSlot {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceSlot::PreClass => "课前",
            ResourceSlot::InClassMain => "课程",
            ResourceSlot::InClassAssist => "课辅",
            ResourceSlot::AfterClass => "课后",
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Syllabus {
    #[serde(default, deserialize_with = "flex_string")]
    pub id: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub name: String,
    #[serde(default, deserialize_with = "flex_flag")]
    pub is_resource: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub children: Vec<Syllabus>,
    #[serde(default, deserialize_with = "nullable")]
    pub pre_class_resource: Vec<Resource>,
    #[serde(default, deserialize_with = "nullable")]
    pub in_class_main_resource: Vec<Resource>,
    #[serde(default, deserialize_with = "nullable")]
    pub in_class_assist_resource: Vec<Resource>,
    #[serde(default, deserialize_with = "nullable")]
    pub after_class_resource: Vec<Resource>,
}

impl Syllabus {
    /// 按固定顺序返回四个资源槽位
    pub fn slots(&self) -> [(ResourceSlot, &[Resource]); 4] {
        [
            (ResourceSlot::PreClass, &self.pre_class_resource),
            (ResourceSlot::InClassMain, &self.in_class_main_resource),
            (ResourceSlot::InClassAssist, &self.in_class_assist_resource),
            (ResourceSlot::AfterClass, &self.after_class_resource),
        ]
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct EpSyllabusResult {
    #[serde(default, deserialize_with = "nullable")]
    pub items: Vec<Syllabus>,
    #[serde(default, deserialize_with = "flex_string")]
    pub syllabus_id: String,
}

// --- 资源 (Resource) ---

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Resource {
    #[serde(default, deserialize_with = "flex_string")]
    pub id: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub title: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub discriminator: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub extension: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub mime: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub path: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub video_id: String,
    /// 字节数，字符串形式
    #[serde(default, deserialize_with = "flex_string")]
    pub filesize: String,
    #[serde(default, rename = "liveUrlPlayBackApp", deserialize_with = "flex_string")]
    pub live_url_play_back_app: String,
}

// --- 视频 (glive2-vod) ---

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ResolutionInfo {
    #[serde(default, deserialize_with = "flex_string")]
    pub name: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub name_simple: String,
    #[serde(default, deserialize_with = "flex_string")]
    pub resolution: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct VideoQuality {
    #[serde(default, deserialize_with = "flex_u64")]
    pub available: u64,
    /// 单位 KB
    #[serde(default, deserialize_with = "flex_u64")]
    pub file_size: u64,
    #[serde(default, deserialize_with = "flex_u64")]
    pub is_watermark: u64,
    #[serde(default, deserialize_with = "flex_string")]
    pub path: String,
    #[serde(default)]
    pub resolution: ResolutionInfo,
    #[serde(default, deserialize_with = "flex_string")]
    pub transcode_id: String,
}

impl VideoQuality {
    pub fn is_usable(&self) -> bool {
        self.available == 1 && !self.path.is_empty()
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct VideoInfo {
    #[serde(default, rename = "defaultType", deserialize_with = "flex_string")]
    pub default_type: String,
    #[serde(default, deserialize_with = "flex_u64")]
    pub duration: u64,
    #[serde(default, deserialize_with = "flex_u64")]
    pub encrypt: u64,
    /// 以清晰度标签为键，BTreeMap 保证遍历顺序稳定
    #[serde(default, deserialize_with = "nullable")]
    pub list: BTreeMap<String, VideoQuality>,
    #[serde(default, deserialize_with = "flex_string")]
    pub title: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct LiveCheckResult {
    #[serde(default, deserialize_with = "flex_string")]
    pub code: String,
}
