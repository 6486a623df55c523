//! 脚本系统
//!
//! JSON 脚本：按顺序执行的命令序列，每条命令是一行会话输入或一次等待。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::session::Session;

/// 脚本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// 命令序列
    pub commands: Vec<ScriptCommand>,
}

/// 脚本命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptCommand {
    /// 一行会话输入（命令或模拟命令）
    Line { line: String },

    /// 等待
    Wait { duration_ms: u64 },
}

/// 脚本执行结果
#[derive(Debug, Default)]
pub struct ScriptResult {
    pub total_commands: usize,
    pub succeeded: Vec<usize>,
    /// (命令序号, 错误信息)
    pub failed: Vec<(usize, String)>,
    pub interrupted: bool,
    pub duration: Duration,
}

/// 脚本执行器
pub struct ScriptExecutor {
    continue_on_error: bool,
    stop: Arc<AtomicBool>,
}

impl ScriptExecutor {
    pub fn new(continue_on_error: bool) -> Self {
        Self {
            continue_on_error,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 中断标志（在命令之间检查）
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// 加载脚本文件
    pub fn load_script(path: impl AsRef<Path>) -> Result<Script> {
        let content = fs::read_to_string(path).context("Failed to read script file")?;
        let script: Script =
            serde_json::from_str(&content).context("Failed to parse script JSON")?;
        Ok(script)
    }

    /// 执行脚本
    pub async fn execute(&self, session: &Session, script: &Script) -> ScriptResult {
        let started = Instant::now();
        let mut result = ScriptResult {
            total_commands: script.commands.len(),
            ..ScriptResult::default()
        };
        info!(
            "Running script '{}' ({} commands)",
            script.name,
            script.commands.len()
        );

        for (i, command) in script.commands.iter().enumerate() {
            if self.stop.load(Ordering::Acquire) {
                warn!("Script '{}' interrupted before command {}", script.name, i + 1);
                result.interrupted = true;
                break;
            }

            match command {
                ScriptCommand::Line { line } => {
                    println!("> {}", line);
                    match session.handle(line) {
                        Ok(output) => {
                            for out in output {
                                println!("  {}", out);
                            }
                            result.succeeded.push(i);
                        },
                        Err(err) => {
                            warn!("Script command {} failed: {}", i + 1, err);
                            println!("  ❌ {}", err);
                            result.failed.push((i, err.to_string()));
                            if !self.continue_on_error {
                                break;
                            }
                        },
                    }
                },
                ScriptCommand::Wait { duration_ms } => {
                    tokio::time::sleep(Duration::from_millis(*duration_ms)).await;
                    result.succeeded.push(i);
                },
            }
        }

        result.duration = started.elapsed();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ace_sdk::AceConfig;

    const CONFIG: &str = r#"
[unit.ACE_1]
drive_stepper = "ace_drive"
selector_stepper = "ace_selector"
home_pin = "PA1"

[lane.lane1]
unit = "ACE_1"
index = 1
"#;

    fn session() -> Session {
        Session::from_config(&AceConfig::from_toml_str(CONFIG).unwrap()).unwrap()
    }

    #[test]
    fn test_parse_script() {
        let script: Script = serde_json::from_str(
            r#"{
                "name": "home",
                "commands": [
                    {"type": "line", "line": "HOME_UNIT UNIT=ACE_1"},
                    {"type": "wait", "duration_ms": 5}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(script.description, "");
        assert_eq!(
            script.commands[1],
            ScriptCommand::Wait { duration_ms: 5 }
        );
    }

    #[tokio::test]
    async fn test_stops_on_first_error() {
        let script = Script {
            name: "t".to_string(),
            description: String::new(),
            commands: vec![
                ScriptCommand::Line {
                    line: "HOME_UNIT UNIT=ACE_9".to_string(),
                },
                ScriptCommand::Line {
                    line: "HOME_UNIT UNIT=ACE_1".to_string(),
                },
            ],
        };
        let result = ScriptExecutor::new(false).execute(&session(), &script).await;
        assert_eq!(result.failed.len(), 1);
        assert!(result.succeeded.is_empty());

        let result = ScriptExecutor::new(true).execute(&session(), &script).await;
        assert_eq!(result.succeeded, vec![1]);
    }

    #[tokio::test]
    async fn test_stop_flag_interrupts() {
        let script = Script {
            name: "t".to_string(),
            description: String::new(),
            commands: vec![ScriptCommand::Wait { duration_ms: 1 }],
        };
        let executor = ScriptExecutor::new(false);
        executor.stop_flag().store(true, Ordering::Release);
        let result = executor.execute(&session(), &script).await;
        assert!(result.interrupted);
        assert!(result.succeeded.is_empty());
    }
}
