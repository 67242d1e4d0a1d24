// src/extractor/harvest.rs

use crate::{error::SoftError, models::MediaDescriptor};

/// 一个分支的提取结果：成功的媒体描述与被吞下的分支错误。
///
/// 各分支的结果按其在课程树中的位置收集，待所有分支结束后按位置顺序拼接，
/// 因此输出顺序与树的先序一致，不受分支完成先后影响。
#[derive(Debug, Default)]
pub struct Harvest {
    pub media: Vec<MediaDescriptor>,
    pub failures: Vec<SoftError>,
}

impl Harvest {
    pub fn from_media(media: MediaDescriptor) -> Self {
        Self {
            media: vec![media],
            failures: Vec::new(),
        }
    }

    pub fn from_failure(failure: SoftError) -> Self {
        Self {
            media: Vec::new(),
            failures: vec![failure],
        }
    }

    pub fn absorb(&mut self, other: Harvest) {
        self.media.extend(other.media);
        self.failures.extend(other.failures);
    }

    pub fn len(&self) -> usize {
        self.media.len()
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }
}

impl FromIterator<Harvest> for Harvest {
    fn from_iter<I: IntoIterator<Item = Harvest>>(branches: I) -> Self {
        branches.into_iter().fold(Harvest::default(), |mut acc, branch| {
            acc.absorb(branch);
            acc
        })
    }
}
