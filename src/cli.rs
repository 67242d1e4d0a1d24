// src/cli.rs

use clap::{Parser, ValueEnum, command, crate_version};
use std::path::PathBuf;

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true,
)]
#[command(group(
    clap::ArgGroup::new("mode")
        .required(true)
        .args(&["url", "batch_file"]),
))]
pub struct Cli {
    // --- 运行模式 (Mode) ---
    /// 指定要解析的课程链接
    #[arg(long, help_heading = "Mode")]
    pub url: Option<String>,
    /// 从文本文件批量解析多个课程链接 (每行一个)
    #[arg(short, long, value_name = "FILE", help_heading = "Mode")]
    pub batch_file: Option<PathBuf>,

    // --- 解析选项 (Options) ---
    /// 提供认证 Token，优先级最高
    #[arg(long, help_heading = "Options")]
    pub token: Option<String>,
    /// 设置同时进行的最大网络请求数
    #[arg(short, long, value_parser = clap::value_parser!(usize), help_heading = "Options")]
    pub workers: Option<usize>,
    /// 以 JSON 格式输出解析结果
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub json: bool,
    /// 逐个检查所有阶段的结构，结构不一致时报错
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub strict_schema: bool,

    // --- 通用选项 (General) ---
    /// 显示此帮助信息并退出
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// 显示版本信息并退出
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// (隐藏参数) 设置日志文件的输出级别，用于调试
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}
