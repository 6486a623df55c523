//! run 命令
//!
//! 在模拟系统上执行脚本文件

use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

use crate::script::ScriptExecutor;
use crate::session::Session;

/// 脚本执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 配置文件路径（TOML）
    pub config: PathBuf,

    /// 脚本文件路径（JSON）
    pub script: PathBuf,

    /// 失败时继续执行
    #[arg(long)]
    pub continue_on_error: bool,
}

impl RunCommand {
    pub async fn execute(&self) -> Result<()> {
        let session = Session::load(&self.config)?;
        let script = ScriptExecutor::load_script(&self.script)?;

        println!("📜 {} ({} commands)", script.name, script.commands.len());
        if !script.description.is_empty() {
            println!("    {}", script.description);
        }
        println!();

        let executor = ScriptExecutor::new(self.continue_on_error);
        let stop = executor.stop_flag();
        ctrlc::set_handler(move || stop.store(true, Ordering::Release))?;

        let result = executor.execute(&session, &script).await;

        println!();
        println!("📊 Result:");
        println!("  Total: {}", result.total_commands);
        println!("  Succeeded: {}", result.succeeded.len());
        println!("  Failed: {}", result.failed.len());
        println!("  Elapsed: {:.2}s", result.duration.as_secs_f64());

        if result.interrupted {
            bail!("Script interrupted");
        }
        if !result.failed.is_empty() {
            for (idx, err) in &result.failed {
                eprintln!("  command {}: {}", idx + 1, err);
            }
            bail!("{} command(s) failed", result.failed.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_defaults() {
        let cmd = RunCommand {
            config: PathBuf::from("ace.toml"),
            script: PathBuf::from("test.json"),
            continue_on_error: false,
        };

        assert!(!cmd.continue_on_error);
        assert_eq!(cmd.script, PathBuf::from("test.json"));
    }
}
