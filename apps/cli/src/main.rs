//! # ACE CLI
//!
//! ACE 选择器单元的命令行工具：配置检查、脚本执行与交互式 Shell，
//! 全部运行在模拟硬件上。
//!
//! ```bash
//! # 校验配置
//! ace-cli check ace.toml
//!
//! # 执行 JSON 脚本
//! ace-cli run ace.toml script.json
//!
//! # 交互式 Shell
//! $ ace-cli shell ace.toml
//! ace> activate lane1
//! ace> ENABLE_TENSION_ASSIST TENSION=ACE_tension1
//! ace> printing on
//! ace> edge PB1 1
//! ace> exit
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod modes;
mod script;
mod session;

use commands::{CheckCommand, RunCommand};
use modes::repl::run_repl;

/// ACE CLI - 耗材选择器命令行工具
#[derive(Parser, Debug)]
#[command(name = "ace-cli")]
#[command(about = "Simulator and config checker for ACE selector units", long_about = None)]
#[command(version)]
struct Cli {
    /// 默认日志过滤规则（`RUST_LOG` 优先）
    #[arg(long, global = true, default_value = "ace_cli=info,warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 校验配置文件
    Check {
        #[command(flatten)]
        args: CheckCommand,
    },

    /// 执行脚本
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 启动交互式 Shell（REPL 模式）
    Shell {
        /// 配置文件路径（TOML）
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    ace_sdk::init_logging_with(&cli.log)?;

    match cli.command {
        Commands::Check { args } => args.execute(),
        Commands::Run { args } => args.execute().await,
        Commands::Shell { config } => run_repl(&config).await,
    }
}
