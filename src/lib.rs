// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod extractor;
pub mod gateway;
pub mod logger;
pub mod manifest;
pub mod models;
pub mod symbols;
pub mod ui;
pub mod utils;

use crate::{
    cli::Cli,
    client::RobustClient,
    config::AppConfig,
    error::{AppError, AppResult},
    extractor::{CourseExtractor, Extraction},
};
use anyhow::anyhow;
use colored::*;
use itertools::Itertools;
use log::{debug, error, info, warn};
use std::{path::Path, sync::Arc};
use url::Url;

/// 一次运行共享的提取上下文
#[derive(Clone)]
pub struct ExtractionContext {
    pub config: Arc<AppConfig>,
    pub extractor: Arc<CourseExtractor>,
    pub args: Arc<Cli>,
}

impl ExtractionContext {
    pub fn new(config: Arc<AppConfig>, args: Arc<Cli>) -> AppResult<Self> {
        let http_client = Arc::new(RobustClient::new(config.clone())?);
        let extractor = CourseExtractor::from_client(http_client).with_strict_schema(args.strict_schema);
        Ok(Self {
            config,
            extractor: Arc::new(extractor),
            args,
        })
    }
}

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);

    let config = Arc::new(AppConfig::new(&args)?);
    if config.auth_token.is_empty() {
        error!("未找到可用的认证 Token");
        return Err(AppError::TokenMissing);
    }
    debug!(
        "接口地址: {}, 最大并发请求数: {}, 清晰度: {}",
        config.api_endpoint, config.max_concurrency, config.resolution
    );

    let context = ExtractionContext::new(config, args.clone())?;

    if let Some(batch_file) = &args.batch_file {
        process_batch_tasks(batch_file, &context).await
    } else if let Some(url) = &args.url {
        let extraction = extract_with_spinner(&context, url).await?;
        if context.args.json {
            println!("{}", serde_json::to_string_pretty(&extraction)?);
            ui::print_failures(&extraction);
        } else {
            ui::print_extraction(&extraction);
        }
        Ok(())
    } else {
        Err(AppError::UserInputError("请通过 --url 或 --batch-file 指定课程链接".to_string()))
    }
}

async fn extract_with_spinner(context: &ExtractionContext, url: &str) -> AppResult<Extraction> {
    let spinner = ui::new_spinner(&format!(
        "正在解析 {}",
        utils::truncate_text(url, constants::TITLE_TRUNCATE_LENGTH)
    ));
    let result = context.extractor.extract(url).await;
    spinner.finish_and_clear();
    result
}

async fn process_batch_tasks(batch_file: &Path, context: &ExtractionContext) -> AppResult<()> {
    let content = std::fs::read_to_string(batch_file).map_err(|e| {
        error!("读取批量文件 '{}' 失败: {}", batch_file.display(), e);
        AppError::from(e)
    })?;

    let tasks: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with('#'))
        .unique()
        .collect();
    if tasks.is_empty() {
        warn!("批量文件 '{}' 为空或不含有效行。", batch_file.display());
        eprintln!("{} 批量文件 '{}' 为空。", *symbols::WARN, batch_file.display());
        return Ok(());
    }
    info!("批量文件 '{}' 含 {} 个任务", batch_file.display(), tasks.len());
    eprintln!("{} 批量文件含 {} 个任务", *symbols::INFO, tasks.len());

    let mut extractions = Vec::with_capacity(tasks.len());
    let mut failed = 0;
    for (i, task) in tasks.iter().enumerate() {
        if !context.args.json {
            ui::print_sub_header(&format!(
                "批量任务 {}/{} - {}",
                i + 1,
                tasks.len(),
                utils::truncate_text(task, constants::TITLE_TRUNCATE_LENGTH)
            ));
        }
        if Url::parse(task).is_err() {
            warn!("跳过无效条目: {}", task);
            eprintln!("{} 跳过无效条目: {}", *symbols::WARN, task);
            continue;
        }
        match extract_with_spinner(context, task).await {
            Ok(extraction) => {
                if !context.args.json {
                    ui::print_extraction(&extraction);
                }
                extractions.push(extraction);
            }
            Err(e) => {
                failed += 1;
                error!("批量任务 '{}' 失败: {}", task, e);
                eprintln!("\n{} 处理任务时发生错误: {}", *symbols::ERROR, e.to_string().red());
            }
        }
    }

    if context.args.json {
        println!("{}", serde_json::to_string_pretty(&extractions)?);
        extractions.iter().for_each(ui::print_failures);
    } else {
        ui::print_header("批量任务报告");
    }
    eprintln!(
        "{} | {} | 总计: {}",
        format!("成功任务: {}", extractions.len()).green(),
        format!("失败任务: {}", failed).red(),
        tasks.len()
    );

    if failed > 0 {
        Err(AppError::Other(anyhow!("{} 个批量任务执行失败。", failed)))
    } else {
        Ok(())
    }
}
