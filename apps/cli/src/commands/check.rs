//! check 命令
//!
//! 加载并校验配置文件，在模拟硬件上完整装配一次系统

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::session::Session;

/// 配置检查命令参数
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// 配置文件路径（TOML）
    pub config: PathBuf,

    /// 以 JSON 输出装配后的状态
    #[arg(long)]
    pub json: bool,
}

impl CheckCommand {
    pub fn execute(&self) -> Result<()> {
        let session = Session::load(&self.config)?;
        let status = session.system().status();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
            return Ok(());
        }

        println!("✅ {} is valid", self.config.display());
        for unit in &status.units {
            let lanes: Vec<&str> = unit.lanes.iter().map(|l| l.name.as_str()).collect();
            println!("  unit {}: {}", unit.name, lanes.join(", "));
        }
        for tension in &status.tensions {
            println!("  tension {}: {} mode", tension.name, tension.mode);
        }
        Ok(())
    }
}
