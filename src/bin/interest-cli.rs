//! 心动 CLI 客户端（测试版）
//!
//! 非交互式 CLI，用于测试心动功能
//! 启动时登录并刷新心动数据，然后执行一个子命令并输出结果

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use matchly_sdk_core::dating::interest::InterestListener;
use matchly_sdk_core::{login_async, ClientConfig, DatingClient};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// 心动 CLI 客户端
#[derive(Parser, Debug)]
#[command(name = "interest-cli")]
#[command(about = "心动 CLI 客户端 - 用于测试心动与自动匹配", long_about = None)]
struct Args {
    /// 登录邮箱
    #[arg(short, long)]
    email: String,

    /// 登录密码
    #[arg(short, long)]
    password: String,

    /// HTTP API 基础地址
    #[arg(long, default_value = "http://localhost:3000/api")]
    api_base_url: String,

    /// 单个请求超时（秒）
    #[arg(long, default_value = "15")]
    timeout: u64,

    /// 日志级别（默认: info,matchly_sdk_core=debug）
    #[arg(long, default_value = "info,matchly_sdk_core=debug")]
    log_level: String,

    /// 日志文件（追加写入），不指定时只输出到控制台
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 列出已发送 / 已收到的心动
    List,
    /// 输出统计数据
    Stats,
    /// 发送心动
    Send { user_id: String },
    /// 删除发出的心动
    Remove { user_id: String },
    /// 查询与某用户的心动状态
    Status { user_id: String },
    /// 是否与某用户互相心动
    Mutual { user_id: String },
}

/// 初始化日志：始终输出到控制台，指定 `--log-file` 时额外追加写入该文件
///
/// `RUST_LOG` 存在时覆盖 `--log-level`
fn init_logger(log_level: &str, log_file: Option<&Path>) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_target(false)
        .with_ansi(true);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("无法打开日志文件 {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(false)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("初始化日志失败")?;

    if let Some(path) = log_file {
        info!("[CLI] 📝 日志同时写入文件: {}", path.display());
    }
    Ok(())
}

struct CliInterestListener;

#[async_trait::async_trait]
impl InterestListener for CliInterestListener {
    async fn on_sent_interests_changed(&self, interests_json: String) {
        info!("[CLI/Interest] 💌 已发送心动变更: {}", interests_json);
    }

    async fn on_received_interests_changed(&self, interests_json: String) {
        info!("[CLI/Interest] 📥 已收到心动变更: {}", interests_json);
    }

    async fn on_interest_stats_changed(&self, stats_json: String) {
        info!("[CLI/Interest] 📊 统计变更: {}", stats_json);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level, args.log_file.as_deref())?;

    info!("[CLI] 🚀 心动 CLI 客户端（测试模式）");
    info!("[CLI] 🔐 正在登录: {}", args.email);
    let login = login_async(&args.api_base_url, args.email.clone(), args.password.clone())
        .await
        .map_err(|e| anyhow::anyhow!("登录失败: {:?}", e))?;
    info!("[CLI] ✅ 登录成功！用户ID: {}", login.user_id);

    let mut config = ClientConfig::new(login.user_id, login.token);
    config.api_base_url = args.api_base_url.clone();
    config.request_timeout = Duration::from_secs(args.timeout);

    let client = DatingClient::new(config)?;
    client.set_interest_listener(Arc::new(CliInterestListener));
    client.on_login().await;

    let store = client.interests();
    match args.command {
        Command::List => {
            let snapshot = store.snapshot();
            info!("[CLI] 💌 已发送（共 {} 条）:", snapshot.sent.len());
            for i in &snapshot.sent {
                let name = i.to_profile.as_ref().and_then(|p| p.name.as_deref());
                info!("[CLI]   -> {} ({}) | {}", i.to_user_id, name.unwrap_or("-"), i.status);
            }
            info!("[CLI] 📥 已收到（共 {} 条）:", snapshot.received.len());
            for i in &snapshot.received {
                let name = i.from_profile.as_ref().and_then(|p| p.name.as_deref());
                info!("[CLI]   <- {} ({}) | {}", i.from_user_id, name.unwrap_or("-"), i.status);
            }
        }
        Command::Stats => {
            println!("{}", serde_json::to_string_pretty(&store.stats())?);
        }
        Command::Send { user_id } => {
            if store.send_interest(&user_id).await {
                info!("[CLI] ✅ 已向 {} 发送心动", user_id);
                if store.is_mutual_interest(&user_id) {
                    info!("[CLI] 💞 与 {} 互相心动，等待服务器自动匹配", user_id);
                }
            } else {
                error!("[CLI] 向 {} 发送心动失败", user_id);
            }
        }
        Command::Remove { user_id } => {
            if store.remove_interest(&user_id).await {
                info!("[CLI] ✅ 已删除发给 {} 的心动", user_id);
            } else {
                error!("[CLI] 删除发给 {} 的心动失败", user_id);
            }
        }
        Command::Status { user_id } => match store.check_interest_status(&user_id).await {
            Some(status) => info!("[CLI] 与 {} 的心动状态: {}", user_id, status),
            None => warn!("[CLI] 与 {} 没有心动记录（或查询失败）", user_id),
        },
        Command::Mutual { user_id } => {
            info!(
                "[CLI] 与 {} 互相心动: {}",
                user_id,
                store.is_mutual_interest(&user_id)
            );
        }
    }

    client.logout().await;
    Ok(())
}
