//! 命令接口
//!
//! 解析 `NAME KEY=VALUE ...` 形式的命令行，并按多路键（`UNIT` / `TENSION`）
//! 交给已注册的单元或控制器执行。命令名与参数键不区分大小写。
//!
//! | 命令 | 参数 |
//! |---|---|
//! | `HOME_UNIT` | `UNIT=<name>` |
//! | `ACE_SET_POSITION` | `UNIT=<name> LANE=<1..4> POSITION=<0..2>` |
//! | `ENABLE_TENSION_ASSIST` | `TENSION=<name>` |
//! | `DISABLE_TENSION_ASSIST` | `TENSION=<name>` |
//! | `SET_TENSION_MODE` | `TENSION=<name> MODE=active\|passive` |
//! | `QUERY_TENSION` | `TENSION=<name>` |

use crate::control::TensionAssist;
use crate::error::CommandError;
use crate::selector::{AceUnit, ExplicitMove};
use ace_protocol::{AssistMode, SelectorPosition};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// 支持的命令及说明
pub const COMMANDS: [(&str, &str); 6] = [
    ("HOME_UNIT", "Home the selector of UNIT"),
    (
        "ACE_SET_POSITION",
        "Move the selector of UNIT to LANE (1-4) at POSITION (0=free, 1=load, 2=unload)",
    ),
    ("ENABLE_TENSION_ASSIST", "Enable tension assist for TENSION"),
    ("DISABLE_TENSION_ASSIST", "Disable tension assist for TENSION"),
    ("SET_TENSION_MODE", "Set tension assist MODE (active/passive) for TENSION"),
    ("QUERY_TENSION", "Report tension assist status for TENSION"),
];

/// 已解析的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcodeCommand {
    name: String,
    params: BTreeMap<String, String>,
}

impl GcodeCommand {
    /// 解析命令行
    ///
    /// ```rust
    /// use ace_client::GcodeCommand;
    ///
    /// let cmd = GcodeCommand::parse("ace_set_position unit=ACE_1 lane=2 POSITION=1").unwrap();
    /// assert_eq!(cmd.name(), "ACE_SET_POSITION");
    /// assert_eq!(cmd.get("UNIT"), Some("ACE_1"));
    /// assert_eq!(cmd.get("lane"), Some("2"));
    /// ```
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().ok_or(CommandError::Empty)?.to_ascii_uppercase();
        let mut params = BTreeMap::new();
        for token in tokens {
            let (key, value) = token
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| CommandError::MalformedParameter(token.to_string()))?;
            params.insert(key.to_ascii_uppercase(), value.to_string());
        }
        Ok(Self { name, params })
    }

    /// 命令名（大写）
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 参数值（键不区分大小写）
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(&key.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// 必需参数
    pub fn require(&self, key: &'static str) -> Result<&str, CommandError> {
        self.get(key).ok_or_else(|| CommandError::MissingParameter {
            command: self.name.clone(),
            key,
        })
    }

    /// 必需整数参数，要求落在 `[min, max]` 内
    pub fn get_int(&self, key: &'static str, min: i64, max: i64) -> Result<i64, CommandError> {
        let raw = self.require(key)?;
        let value: i64 = raw.parse().map_err(|_| CommandError::InvalidParameter {
            key,
            value: raw.to_string(),
            reason: "expected an integer".to_string(),
        })?;
        if !(min..=max).contains(&value) {
            return Err(CommandError::InvalidParameter {
                key,
                value: raw.to_string(),
                reason: format!("must be between {} and {}", min, max),
            });
        }
        Ok(value)
    }
}

/// 命令响应（逐行输出给用户）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResponse {
    pub lines: Vec<String>,
}

impl CommandResponse {
    pub fn line(message: impl Into<String>) -> Self {
        Self {
            lines: vec![message.into()],
        }
    }
}

impl fmt::Display for CommandResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

/// 命令分发器
#[derive(Debug, Default)]
pub struct CommandDispatcher {
    units: BTreeMap<String, Arc<AceUnit>>,
    tensions: BTreeMap<String, Arc<TensionAssist>>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册单元（`UNIT=` 多路键）
    pub fn register_unit(&mut self, unit: Arc<AceUnit>) {
        self.units.insert(unit.name().to_string(), unit);
    }

    /// 注册控制器（`TENSION=` 多路键）
    pub fn register_tension(&mut self, assist: Arc<TensionAssist>) {
        self.tensions.insert(assist.name().to_string(), assist);
    }

    /// 解析并执行一行命令
    pub fn execute(&self, line: &str) -> Result<CommandResponse, CommandError> {
        let command = GcodeCommand::parse(line)?;
        self.dispatch(&command)
    }

    /// 执行已解析的命令
    pub fn dispatch(&self, command: &GcodeCommand) -> Result<CommandResponse, CommandError> {
        match command.name() {
            "HOME_UNIT" => self.cmd_home_unit(command),
            "ACE_SET_POSITION" => self.cmd_set_position(command),
            "ENABLE_TENSION_ASSIST" => self.cmd_enable(command),
            "DISABLE_TENSION_ASSIST" => self.cmd_disable(command),
            "SET_TENSION_MODE" => self.cmd_set_mode(command),
            "QUERY_TENSION" => self.cmd_query(command),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    fn unit(&self, command: &GcodeCommand) -> Result<&Arc<AceUnit>, CommandError> {
        let name = command.require("UNIT")?;
        self.units
            .get(name)
            .ok_or_else(|| CommandError::UnknownTarget {
                kind: "unit",
                name: name.to_string(),
            })
    }

    fn tension(&self, command: &GcodeCommand) -> Result<&Arc<TensionAssist>, CommandError> {
        let name = command.require("TENSION")?;
        self.tensions
            .get(name)
            .ok_or_else(|| CommandError::UnknownTarget {
                kind: "tension controller",
                name: name.to_string(),
            })
    }

    fn cmd_home_unit(&self, command: &GcodeCommand) -> Result<CommandResponse, CommandError> {
        let unit = self.unit(command)?;
        unit.home()?;
        Ok(CommandResponse::line(format!("{} homed", unit.name())))
    }

    fn cmd_set_position(&self, command: &GcodeCommand) -> Result<CommandResponse, CommandError> {
        let unit = self.unit(command)?;
        let lane = command.get_int("LANE", 1, 4)? as u8;
        let position = SelectorPosition::from_u8(command.get_int("POSITION", 0, 2)? as u8)?;

        let message = match unit.set_position_explicit(lane, position)? {
            ExplicitMove::Moved { index, position, .. } => {
                format!("Moved to lane {}, position {}", index, position.as_u8())
            },
            ExplicitMove::LaneNotFound(index) => format!("Lane {} not found", index),
        };
        Ok(CommandResponse::line(message))
    }

    fn cmd_enable(&self, command: &GcodeCommand) -> Result<CommandResponse, CommandError> {
        let assist = self.tension(command)?;
        assist.enable()?;
        let message = if assist.is_enabled() {
            format!("Tension assist enabled for {} ({} mode)", assist.name(), assist.mode())
        } else {
            format!("Cannot enable tension assist for {}: no current lane", assist.name())
        };
        Ok(CommandResponse::line(message))
    }

    fn cmd_disable(&self, command: &GcodeCommand) -> Result<CommandResponse, CommandError> {
        let assist = self.tension(command)?;
        assist.disable();
        Ok(CommandResponse::line(format!(
            "Tension assist disabled for {}",
            assist.name()
        )))
    }

    fn cmd_set_mode(&self, command: &GcodeCommand) -> Result<CommandResponse, CommandError> {
        let assist = self.tension(command)?;
        let mode = match command.get("MODE") {
            Some(raw) => raw.parse::<AssistMode>().inspect_err(|e| {
                error!("{}: {}", assist.name(), e);
            })?,
            None => assist.mode(),
        };
        assist.set_mode(mode)?;
        Ok(CommandResponse::line(format!(
            "Tension assist mode for {} set to {}",
            assist.name(),
            mode
        )))
    }

    fn cmd_query(&self, command: &GcodeCommand) -> Result<CommandResponse, CommandError> {
        let assist = self.tension(command)?;
        let report = assist.query_report();
        info!("{}", report);
        Ok(CommandResponse {
            lines: report.lines().map(str::to_string).collect(),
        })
    }
}
