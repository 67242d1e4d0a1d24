// src/logger.rs

use crate::{cli::LogLevel, constants};
use log::{LevelFilter, warn};
use std::{env, fs, path::PathBuf};

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Off => LevelFilter::Off,
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

fn log_file_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home
            .join(constants::CONFIG_DIR_NAME)
            .join(constants::LOG_FILE_NAME),
        None => {
            eprintln!("警告: 无法获取用户主目录，日志将写入临时目录。");
            env::temp_dir()
                .join(clap::crate_name!())
                .join(constants::LOG_FILE_NAME)
        }
    }
}

/// 初始化文件日志。级别为 Off 时不做任何事；日志文件无法打开时退回临时目录，仍失败则放弃记录。
pub fn init_logger(level: LogLevel) {
    if level == LogLevel::Off {
        return;
    }

    let path = log_file_path();
    if let Some(dir) = path.parent()
        && let Err(e) = fs::create_dir_all(dir)
    {
        eprintln!("警告: 无法创建日志目录 {:?}: {}", dir, e);
    }

    let file_appender = match fern::log_file(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("警告: 无法打开日志文件 {:?}: {}。将尝试使用备用日志文件。", path, e);
            let fallback = env::temp_dir().join(format!(
                "{}-{}",
                clap::crate_name!(),
                constants::LOG_FALLBACK_FILE_NAME
            ));
            match fern::log_file(&fallback) {
                Ok(file) => {
                    warn!("日志将写入备用文件: {:?}", fallback);
                    file
                }
                Err(e) => {
                    eprintln!("错误: 无法创建备用日志文件 {:?}: {}。日志将不会被记录。", fallback, e);
                    return;
                }
            }
        }
    };

    let result = fern::Dispatch::new()
        .level(level_filter(level))
        // 第三方 HTTP 栈的日志过于嘈杂
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] [{:<5}] [{}:{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.line().unwrap_or(0),
                message
            ))
        })
        .chain(file_appender)
        .apply();

    if let Err(e) = result {
        eprintln!("警告: 日志系统初始化失败: {}", e);
    }
}
