// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use gaodun_dl::{cli::Cli, logger, run_from_cli};
use std::{env, sync::Arc, time::Duration};

#[tokio::main]
async fn main() {
    // 为 Windows 终端启用 ANSI 颜色支持
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} 用户强制中断程序。", "[!]".yellow());
            tokio::time::sleep(Duration::from_millis(100)).await;
            std::process::exit(130);
        }
    });

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| "gaodun-dl".to_string());

    let after_help = format!(
        "示例:\n  # 解析单个课程链接\n  {bin} --url \"https://www.gaodun.com/course/?course_id=12345\"\n\n  # 以 JSON 输出解析结果\n  {bin} --url \"https://...\" --json\n\n  # 批量解析 (每行一个链接)\n  {bin} -b my_courses.txt -w 16",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };

    logger::init_logger(args.log_level);
    log::info!("{} v{} 启动", clap::crate_name!(), clap::crate_version!());

    if let Err(e) = run_from_cli(args).await {
        log::error!("程序执行出错: {}", e);
        eprintln!("\n{} {}", "[X]".red(), format!("程序执行出错: {}", e).red());
        std::process::exit(1);
    }
}
