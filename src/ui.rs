// src/ui.rs

use crate::{
    constants,
    extractor::Extraction,
    models::{MediaDescriptor, MediaKind},
    symbols, utils,
};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

/// 提取期间显示的转圈提示，输出到 stderr，不影响 JSON 输出
pub fn new_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn kind_label(kind: MediaKind) -> ColoredString {
    match kind {
        MediaKind::Video => "视频".green(),
        MediaKind::Document => "讲义".blue(),
    }
}

fn print_media(index: usize, media: &MediaDescriptor) {
    let title = media.title.to_string_lossy();
    println!(
        "  {:>3}. [{}] {}",
        index + 1,
        kind_label(media.kind),
        utils::truncate_text(&title, constants::TITLE_TRUNCATE_LENGTH)
    );
    for stream in media.streams.values() {
        println!(
            "       {} {} | {} | {} 个分片",
            "└".dimmed(),
            stream.quality,
            utils::human_size(stream.size),
            stream.parts.len()
        );
    }
}

/// 以人类可读的形式打印一门课程的提取结果
pub fn print_extraction(extraction: &Extraction) {
    print_header(&format!(
        "课程 {} ({})",
        extraction.course_id, extraction.schema
    ));

    if extraction.media.is_empty() {
        println!("{} 未找到任何可下载的媒体。", *symbols::WARN);
    }
    for (i, media) in extraction.media.iter().enumerate() {
        print_media(i, media);
    }

    let videos = extraction
        .media
        .iter()
        .filter(|m| m.kind == MediaKind::Video)
        .count();
    let parts: usize = extraction.media.iter().map(MediaDescriptor::total_parts).sum();
    println!(
        "\n{} 共 {} 个媒体: {} | {} | 下载单元 {}",
        *symbols::OK,
        extraction.media.len(),
        format!("视频 {}", videos).green(),
        format!("讲义 {}", extraction.media.len() - videos).blue(),
        parts
    );
    print_failures(extraction);
}

/// 分支错误不影响结果输出，统一打印到 stderr
pub fn print_failures(extraction: &Extraction) {
    if extraction.failures.is_empty() {
        return;
    }
    eprintln!(
        "\n{} {} 个分支提取失败，结果可能不完整:",
        *symbols::WARN,
        extraction.failures.len()
    );
    for failure in &extraction.failures {
        eprintln!("  - {}", failure.to_string().yellow());
    }
}
