// src/utils.rs

use crate::constants;
use regex::Regex;
use std::sync::LazyLock;

static ILLEGAL_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).unwrap());

fn is_edge_junk(c: char) -> bool {
    c == ' ' || c == '.'
}

/// 将任意文本规范化为可安全用作路径片段的名称。
///
/// 非法字符替换为 `-`，去除首尾的空格与点，长度超过上限时按字符截断后再次去除尾部空格与点。
/// 空输入返回空字符串，由调用方决定兜底名称。
pub fn sanitize_segment(name: &str) -> String {
    let replaced = ILLEGAL_CHARS_RE.replace_all(name, "-");
    let trimmed = replaced.trim_matches(is_edge_junk);

    if trimmed.chars().count() <= constants::MAX_SEGMENT_CHARS {
        return trimmed.to_string();
    }

    let truncated: String = trimmed.chars().take(constants::MAX_SEGMENT_CHARS).collect();
    truncated.trim_end_matches(is_edge_junk).to_string()
}

/// 按显示宽度截断文本（中文字符按 2 计），用于终端输出。
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 { text.to_string() } else { format!("{}...", &text[..end_pos]) }
}

/// 把字节数格式化为人类可读的大小
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 { format!("{} B", bytes) } else { format!("{:.1} {}", size, UNITS[unit]) }
}
