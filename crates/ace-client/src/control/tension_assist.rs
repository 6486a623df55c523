//! 张力辅助控制器
//!
//! 打印过程中，当前通道的张力开关报告"拉紧"时，通过共享驱动电机送出一段耗材以释放张力。
//!
//! # 模式
//!
//! - **Active**：启用期间选择器保持在当前通道的 LOAD 位置，上升沿触发送料
//! - **Passive**：选择器保持在 FREE 位置，边沿只记录不送料
//!
//! # 触发条件
//!
//! 上升沿触发送料需要同时满足：
//! - 主动模式且已启用
//! - 宿主就绪、正在打印、未暂停、未在换料
//! - 距上次送料不少于最小间隔（默认 0.5s，单调时钟）
//!
//! # 使用示例
//!
//! ```rust
//! use ace_client::control::{TensionAssist, TensionSettings};
//! use ace_driver::mock::MockPrintMonitor;
//! use ace_protocol::AssistMode;
//! use std::sync::Arc;
//! use std::time::Instant;
//!
//! let print = Arc::new(MockPrintMonitor::printing_with("lane1"));
//! let assist = TensionAssist::new("ACE_tension1", TensionSettings::default(), print);
//!
//! // 被动模式：边沿只记录电平
//! assert!(!assist.on_tension_edge(Instant::now(), true));
//! assert!(assist.tension_level());
//! assert_eq!(assist.mode(), AssistMode::Passive);
//! assert_eq!(assist.buffer_status(), "Disabled");
//! ```

use crate::error::SelectorError;
use crate::lane::Lane;
use crate::status::TensionStatus;
use ace_driver::{MoveCommand, PrintMonitor};
use ace_protocol::AssistMode;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// 默认最小送料间隔
pub const MIN_ASSIST_INTERVAL: Duration = Duration::from_millis(500);

/// 控制器运行参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensionSettings {
    /// 初始模式
    pub assist_mode: AssistMode,
    /// 每次送料长度（mm）
    pub feed_length: f64,
    /// 送料速度（mm/s）
    pub feed_speed: f64,
    /// 送料加速度（mm/s²）
    pub feed_accel: f64,
    /// 保留参数
    pub hub_retract_distance: f64,
    /// 两次送料之间的最小间隔
    pub min_assist_interval: Duration,
    /// 将送料诊断日志从 trace 提升到 debug
    pub debug: bool,
    /// 是否在界面中显示传感器
    pub show_sensors: bool,
}

impl Default for TensionSettings {
    fn default() -> Self {
        Self {
            assist_mode: AssistMode::Passive,
            feed_length: 10.0,
            feed_speed: 50.0,
            feed_accel: 400.0,
            hub_retract_distance: 20.0,
            min_assist_interval: MIN_ASSIST_INTERVAL,
            debug: false,
            show_sensors: false,
        }
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    enabled: bool,
    mode: AssistMode,
    current_lane: Option<Arc<Lane>>,
    /// 曾经绑定过的通道（按绑定顺序）
    bound_lanes: Vec<String>,
    tension_level: bool,
    last_assist: Option<Instant>,
}

/// 张力辅助控制器
pub struct TensionAssist {
    name: String,
    settings: TensionSettings,
    print: Arc<dyn PrintMonitor>,
    state: Mutex<ControllerState>,
}

impl fmt::Debug for TensionAssist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensionAssist")
            .field("name", &self.name)
            .field("settings", &self.settings)
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl TensionAssist {
    /// 创建控制器（初始为禁用状态）
    pub fn new(
        name: impl Into<String>,
        settings: TensionSettings,
        print: Arc<dyn PrintMonitor>,
    ) -> Self {
        Self {
            name: name.into(),
            settings,
            print,
            state: Mutex::new(ControllerState {
                mode: settings.assist_mode,
                ..ControllerState::default()
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &TensionSettings {
        &self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    pub fn mode(&self) -> AssistMode {
        self.state.lock().mode
    }

    /// 张力开关最近电平
    pub fn tension_level(&self) -> bool {
        self.state.lock().tension_level
    }

    pub fn current_lane(&self) -> Option<Arc<Lane>> {
        self.state.lock().current_lane.clone()
    }

    /// 最近一次送料的时间
    pub fn last_assist(&self) -> Option<Instant> {
        self.state.lock().last_assist
    }

    // ==================== 状态转换 ====================

    /// 启用
    ///
    /// 没有当前通道时只记录警告，保持禁用。
    /// 启用后按模式将选择器移动到当前通道的 LOAD（主动）或 FREE（被动）。
    ///
    /// 定位失败（例如归零失败）时回滚为禁用状态并返回错误：
    /// 选择器位置未知，不能继续送料。
    pub fn enable(&self) -> Result<(), SelectorError> {
        let (lane, mode) = {
            let mut state = self.state.lock();
            let Some(lane) = state.current_lane.clone() else {
                warn!("{} cannot enable tension assist: no current lane", self.name);
                return Ok(());
            };
            state.enabled = true;
            (lane, state.mode)
        };
        info!(
            "{} tension assist enabled in {} mode for {}",
            self.name,
            mode,
            lane.name()
        );
        self.hold_position(&lane, mode)
    }

    /// 禁用（不移动选择器）
    pub fn disable(&self) {
        self.state.lock().enabled = false;
        info!("{} tension assist disabled", self.name);
    }

    /// 切换模式
    ///
    /// 已启用时立即按新模式重新定位选择器；定位失败时与 [`enable`](Self::enable) 一样回滚为禁用。
    pub fn set_mode(&self, mode: AssistMode) -> Result<(), SelectorError> {
        let reposition = {
            let mut state = self.state.lock();
            let previous = state.mode;
            state.mode = mode;
            info!(
                "{} tension assist mode changed from {} to {}",
                self.name, previous, mode
            );
            if state.enabled {
                state.current_lane.clone()
            } else {
                None
            }
        };
        match reposition {
            Some(lane) => self.hold_position(&lane, mode),
            None => Ok(()),
        }
    }

    /// 绑定当前通道（`None` 解除绑定）
    pub fn set_current_lane(&self, lane: Option<Arc<Lane>>) {
        let mut state = self.state.lock();
        if let Some(lane) = &lane {
            if !state.bound_lanes.iter().any(|name| name == lane.name()) {
                state.bound_lanes.push(lane.name().to_string());
            }
            debug!("{} bound to {}", self.name, lane.name());
        } else {
            debug!("{} unbound from lane", self.name);
        }
        state.current_lane = lane;
    }

    /// 按模式定位选择器，失败时禁用
    fn hold_position(&self, lane: &Arc<Lane>, mode: AssistMode) -> Result<(), SelectorError> {
        self.position_selector(lane, mode).inspect_err(|e| {
            self.state.lock().enabled = false;
            error!(
                "{} tension assist disabled, cannot position selector for {}: {}",
                self.name,
                lane.name(),
                e
            );
        })
    }

    fn position_selector(&self, lane: &Arc<Lane>, mode: AssistMode) -> Result<(), SelectorError> {
        let unit = lane.unit().ok_or_else(|| SelectorError::UnitDropped {
            lane: lane.name().to_string(),
        })?;
        unit.set_selector_position(lane, mode.selector_position())
    }

    // ==================== 传感器 ====================

    /// 张力开关边沿
    ///
    /// 总是记录电平；满足触发条件时执行一次阻塞送料。
    /// 返回是否触发了送料（送料本身失败也视为已触发）。
    pub fn on_tension_edge(&self, timestamp: Instant, state: bool) -> bool {
        let print_ok = self.print_allows_assist();
        let lane = {
            let mut controller = self.state.lock();
            controller.tension_level = state;
            if !(controller.enabled && controller.mode.is_active()) || !print_ok || !state {
                return false;
            }
            if let Some(last) = controller.last_assist {
                let elapsed = timestamp.saturating_duration_since(last);
                if elapsed < self.settings.min_assist_interval {
                    trace!(
                        "{} tension assist suppressed ({:?} since last feed)",
                        self.name, elapsed
                    );
                    return false;
                }
            }
            controller.last_assist = Some(timestamp);
            controller.current_lane.clone()
        };
        self.diagnostic(format_args!(
            "{} tension assist triggered at {:?}",
            self.name, timestamp
        ));
        self.feed(lane.as_deref());
        true
    }

    fn print_allows_assist(&self) -> bool {
        self.print.is_ready()
            && self.print.is_printing()
            && !self.print.is_paused()
            && !self.print.in_toolchange()
    }

    /// 执行一次送料；所有错误只记录日志
    fn feed(&self, lane: Option<&Lane>) {
        let Some(drive) = lane.and_then(|lane| lane.unit()).and_then(|u| u.drive_actuator()) else {
            error!(
                "{} cannot perform tension assist: drive actuator not found",
                self.name
            );
            return;
        };
        let command = MoveCommand::new(
            self.settings.feed_length,
            self.settings.feed_speed,
            self.settings.feed_accel,
        )
        .blocking();
        match drive.move_by(command) {
            Ok(()) => self.diagnostic(format_args!(
                "{} fed {}mm due to tension",
                self.name, self.settings.feed_length
            )),
            Err(e) => error!("{} error during tension assist: {}", self.name, e),
        }
    }

    fn diagnostic(&self, message: fmt::Arguments<'_>) {
        if self.settings.debug {
            debug!("{}", message);
        } else {
            trace!("{}", message);
        }
    }

    // ==================== 状态 ====================

    /// 缓冲状态描述
    pub fn buffer_status(&self) -> String {
        let state = self.state.lock();
        buffer_status(state.enabled, state.mode)
    }

    /// 状态快照
    pub fn status(&self) -> TensionStatus {
        let state = self.state.lock();
        TensionStatus {
            name: self.name.clone(),
            enabled: state.enabled,
            mode: state.mode,
            tension_state: state.tension_level,
            lanes: state.bound_lanes.clone(),
            current_lane: state.current_lane.as_ref().map(|l| l.name().to_string()),
            buffer_status: buffer_status(state.enabled, state.mode),
            feed_length: self.settings.feed_length,
            feed_speed: self.settings.feed_speed,
            show_sensors: self.settings.show_sensors,
        }
    }

    /// 多行可读状态报告（`QUERY_TENSION`）
    pub fn query_report(&self) -> String {
        let status = self.status();
        [
            format!("Tension Assist Status for {}:", status.name),
            format!("  Enabled: {}", status.enabled),
            format!("  Mode: {}", status.mode),
            format!(
                "  Tension Sensor State: {}",
                if status.tension_state {
                    "TRIGGERED"
                } else {
                    "Clear"
                }
            ),
            format!("  Feed Length: {:.1}mm", status.feed_length),
            format!("  Feed Speed: {:.1}mm/s", status.feed_speed),
            format!(
                "  Current Lane: {}",
                status.current_lane.as_deref().unwrap_or("None")
            ),
        ]
        .join("\n")
    }
}

fn buffer_status(enabled: bool, mode: AssistMode) -> String {
    if enabled {
        format!("{} mode enabled", mode.title())
    } else {
        "Disabled".to_string()
    }
}
