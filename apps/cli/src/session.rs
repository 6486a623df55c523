//! 模拟会话
//!
//! 从配置文件装配带模拟硬件的 [`AceSystem`]，并在命令接口之外
//! 提供一组小写的模拟命令（打印状态、传感器边沿、选择器漂移等）。

use ace_sdk::client::commands::COMMANDS;
use ace_sdk::driver::SensorEvent;
use ace_sdk::driver::mock::SimulatedSelector;
use ace_sdk::simulation::Simulation;
use ace_sdk::{AceConfig, AceSystem};
use anyhow::{Context, Result, anyhow, bail};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// 模拟命令说明
pub const SIM_COMMANDS: [(&str, &str); 12] = [
    ("printing on|off", "Set the simulated print state"),
    ("paused on|off", "Pause or resume the simulated print"),
    ("toolchange on|off", "Mark a tool change in progress"),
    ("current <lane>|none", "Set the lane the printer is using"),
    ("activate <lane>", "Bind a lane to its tension controller"),
    ("release <lane>", "Unbind a lane from its tension controller"),
    ("edge <pin> 0|1", "Inject a sensor edge and process it"),
    ("drift <unit> <pos>", "Move the simulated selector by hand"),
    ("break <unit>", "Break the home switch of a unit"),
    ("moves <unit>", "Show selector moves issued so far"),
    ("feeds <stepper>", "Show drive moves issued so far"),
    ("status", "Print the system status as JSON"),
];

/// 带模拟硬件的系统
pub struct Session {
    system: AceSystem,
    sim: Simulation,
}

impl Session {
    /// 加载配置并装配系统
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = AceConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &AceConfig) -> Result<Self> {
        let (mut hardware, sim) = Simulation::hardware(config);
        let system = AceSystem::from_config(config, &mut hardware)?;
        Ok(Self { system, sim })
    }

    pub fn system(&self) -> &AceSystem {
        &self.system
    }

    /// 执行一行输入，返回输出行
    ///
    /// 小写关键字为模拟命令，其余交给命令接口。
    pub fn handle(&self, line: &str) -> Result<Vec<String>> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&keyword) = parts.first() else {
            return Ok(Vec::new());
        };

        match keyword {
            "printing" => {
                self.sim.print.set_printing(switch_arg(&parts)?);
                Ok(vec![format!("printing: {}", parts[1])])
            },
            "paused" => {
                self.sim.print.set_paused(switch_arg(&parts)?);
                Ok(vec![format!("paused: {}", parts[1])])
            },
            "toolchange" => {
                self.sim.print.set_toolchange(switch_arg(&parts)?);
                Ok(vec![format!("toolchange: {}", parts[1])])
            },
            "current" => {
                let lane = arg(&parts, 1, "lane")?;
                let lane = (lane != "none").then(|| lane.to_string());
                self.sim.print.set_current_lane(lane.clone());
                Ok(vec![format!(
                    "current lane: {}",
                    lane.as_deref().unwrap_or("none")
                )])
            },
            "activate" => {
                let lane = arg(&parts, 1, "lane")?;
                let message = match self.system.activate_lane(lane)? {
                    Some(tension) => format!("{} bound to {}", lane, tension),
                    None => format!("{} has no tension controller", lane),
                };
                Ok(vec![message])
            },
            "release" => {
                let lane = arg(&parts, 1, "lane")?;
                self.system.release_lane(lane)?;
                Ok(vec![format!("{} released", lane)])
            },
            "edge" => {
                let pin = arg(&parts, 1, "pin")?;
                let state = match arg(&parts, 2, "state")? {
                    "1" | "on" => true,
                    "0" | "off" => false,
                    other => bail!("Invalid edge state '{}', expected 0 or 1", other),
                };
                self.system
                    .sensor_sender()
                    .publish(SensorEvent::new(pin, state, Instant::now()))?;
                let handled = self.system.run_pending();
                Ok(vec![format!("{} -> {} ({} events)", pin, u8::from(state), handled)])
            },
            "drift" => {
                let selector = self.selector(arg(&parts, 1, "unit")?)?;
                let position: f64 = arg(&parts, 2, "position")?
                    .parse()
                    .context("Invalid selector position")?;
                selector.set_position(position);
                Ok(vec![format!("selector at {}", position)])
            },
            "break" => {
                let unit = arg(&parts, 1, "unit")?;
                self.selector(unit)?.break_home_switch();
                Ok(vec![format!("{} home switch broken", unit)])
            },
            "moves" => {
                let selector = self.selector(arg(&parts, 1, "unit")?)?;
                Ok(vec![format!(
                    "{:?} (position {})",
                    selector.distances(),
                    selector.position()
                )])
            },
            "feeds" => {
                let name = arg(&parts, 1, "stepper")?;
                let drive = self
                    .sim
                    .drive(name)
                    .ok_or_else(|| anyhow!("Unknown drive stepper '{}'", name))?;
                Ok(vec![format!("{:?}", drive.distances())])
            },
            "status" => {
                let json = serde_json::to_string_pretty(&self.system.status())?;
                Ok(json.lines().map(str::to_string).collect())
            },
            _ => Ok(self.system.execute(line)?.lines),
        }
    }

    fn selector(&self, unit: &str) -> Result<&Arc<SimulatedSelector>> {
        self.sim
            .selector(unit)
            .ok_or_else(|| anyhow!("Unknown unit '{}'", unit))
    }
}

/// 帮助文本
pub fn help_lines() -> Vec<String> {
    let mut lines = vec!["Commands:".to_string()];
    lines.extend(
        COMMANDS
            .iter()
            .map(|(name, help)| format!("  {:<24} {}", name, help)),
    );
    lines.push("Simulation:".to_string());
    lines.extend(
        SIM_COMMANDS
            .iter()
            .map(|(name, help)| format!("  {:<24} {}", name, help)),
    );
    lines
}

fn arg<'a>(parts: &[&'a str], index: usize, name: &str) -> Result<&'a str> {
    parts
        .get(index)
        .copied()
        .ok_or_else(|| anyhow!("Missing <{}> for '{}'", name, parts[0]))
}

fn switch_arg(parts: &[&str]) -> Result<bool> {
    match arg(parts, 1, "on|off")? {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        other => bail!("Expected on or off, got '{}'", other),
    }
}
