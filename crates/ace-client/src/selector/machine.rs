//! 选择器定位/归零状态机
//!
//! 维护"当前选中通道 + 位置"的逻辑模型，将 (通道, 位置) 转换为选择器位移，
//! 并在位置不可信时通过归零开关重新建立绝对参考。
//!
//! # 定位策略
//!
//! 位移总是相对归零参考计算。同一通道内的重新定位只发出
//! `目标位移 - 上次命令位移` 的修正量；切换通道或位置未知时先归零。

use super::SelectorUnit;
use crate::error::SelectorError;
use crate::lane::Lane;
use crate::status::{LaneStatus, UnitStatus};
use ace_driver::{Actuator, ErrorReporter, Indicator, MoveCommand, PrintMonitor, SwitchLevel};
use ace_protocol::{SelectorGeometry, SelectorPosition};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

// ==================== 常量 ====================

/// 归零爬行步长（朝归零方向）
const CREEP_DISTANCE: f64 = -1.0;
/// 归零爬行速度
const CREEP_SPEED: f64 = 20.0;
/// 归零爬行加速度
const CREEP_ACCEL: f64 = 20.0;

const INDICATOR_ON: f32 = 1.0;
const INDICATOR_DIM: f32 = 0.3;
const INDICATOR_OFF: f32 = 0.0;

// ==================== 配置 ====================

/// 单元运行参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSettings {
    /// 选择器几何
    pub geometry: SelectorGeometry,
    /// 定位移动速度
    pub selector_speed: f64,
    /// 定位移动加速度
    pub selector_accel: f64,
    /// 是否在界面中显示传感器
    pub show_sensors: bool,
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            geometry: SelectorGeometry::default(),
            selector_speed: 50.0,
            selector_accel: 50.0,
            show_sensors: false,
        }
    }
}

// ==================== 状态 ====================

#[derive(Debug, Clone)]
struct Selection {
    lane: Arc<Lane>,
    position: SelectorPosition,
    /// 相对归零参考的命令位移
    displacement: i32,
}

/// 选择器逻辑状态
///
/// 通道与位置保存在同一个字段中，二者总是同时为 `None` 或同时有值。
#[derive(Debug, Clone, Default)]
pub struct SelectorState {
    selection: Option<Selection>,
    is_homed: bool,
    home_failed: bool,
    prep_homed: bool,
}

impl SelectorState {
    /// 当前选中的通道
    pub fn selected_lane(&self) -> Option<&Arc<Lane>> {
        self.selection.as_ref().map(|s| &s.lane)
    }

    /// 当前选中的位置
    pub fn selected_position(&self) -> Option<SelectorPosition> {
        self.selection.as_ref().map(|s| s.position)
    }

    /// 最近一次命令的位移（相对归零参考）
    pub fn last_commanded(&self) -> Option<i32> {
        self.selection.as_ref().map(|s| s.displacement)
    }

    pub fn is_homed(&self) -> bool {
        self.is_homed
    }

    pub fn home_failed(&self) -> bool {
        self.home_failed
    }

    /// 是否完成过预检归零
    pub fn prep_homed(&self) -> bool {
        self.prep_homed
    }

    fn is_selected(&self, lane: &Arc<Lane>) -> bool {
        self.selection
            .as_ref()
            .is_some_and(|s| Arc::ptr_eq(&s.lane, lane))
    }

    /// 物理位置不再可信
    fn invalidate(&mut self) {
        self.selection = None;
        self.is_homed = false;
    }
}

/// 显式定位命令的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplicitMove {
    Moved {
        lane: String,
        index: u8,
        position: SelectorPosition,
    },
    /// 单元内没有该编号的通道（未发出任何移动）
    LaneNotFound(u8),
}

// ==================== 单元 ====================

/// ACE 选择器单元
///
/// 由 [`UnitBuilder`](super::UnitBuilder) 构建，持有所有通道。
pub struct AceUnit {
    pub(super) name: String,
    pub(super) settings: UnitSettings,
    pub(super) selector: Arc<dyn Actuator>,
    pub(super) drive: Arc<dyn Actuator>,
    pub(super) home: SwitchLevel,
    pub(super) common_tension: Option<SwitchLevel>,
    /// 按编号排序
    pub(super) lanes: Vec<Arc<Lane>>,
    pub(super) print: Arc<dyn PrintMonitor>,
    pub(super) reporter: Arc<dyn ErrorReporter>,
    pub(super) indicator: Option<Arc<dyn Indicator>>,
    pub(super) state: Mutex<SelectorState>,
}

impl std::fmt::Debug for AceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AceUnit")
            .field("name", &self.name)
            .field("settings", &self.settings)
            .field("selector", &self.selector.name())
            .field("drive", &self.drive.name())
            .field("lanes", &self.lanes.len())
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl AceUnit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &UnitSettings {
        &self.settings
    }

    /// 所有通道（按编号排序）
    pub fn lanes(&self) -> &[Arc<Lane>] {
        &self.lanes
    }

    /// 按编号查找通道
    pub fn lane(&self, index: u8) -> Option<&Arc<Lane>> {
        self.lanes.iter().find(|lane| lane.index() == index)
    }

    /// 按名称查找通道
    pub fn lane_by_name(&self, name: &str) -> Option<&Arc<Lane>> {
        self.lanes.iter().find(|lane| lane.name() == name)
    }

    /// 选择器逻辑状态快照
    pub fn state(&self) -> SelectorState {
        self.state.lock().clone()
    }

    /// 共享驱动电机
    pub fn drive(&self) -> &Arc<dyn Actuator> {
        &self.drive
    }

    // ==================== 归零 ====================

    /// 归零选择器
    ///
    /// 若逻辑位置已知且不在归零位，先发一次快速粗回位，
    /// 然后以固定小步爬行直到归零开关触发或超出移动预算。
    ///
    /// # 错误
    ///
    /// - `SelectorError::HomingFailed`：预算用尽，或之前的失败标志尚未清除
    /// - `SelectorError::Actuator`：选择器执行器故障
    pub fn home(&self) -> Result<(), SelectorError> {
        self.home_inner(false)
    }

    /// `prep` 为 true 时跳过粗回位（启动预检时逻辑位置不可信）
    fn home_inner(&self, prep: bool) -> Result<(), SelectorError> {
        let (home_failed, last_commanded) = {
            let state = self.state.lock();
            (state.home_failed, state.last_commanded())
        };
        if home_failed {
            warn!(
                "{} homing refused: previous homing attempt failed, move the selector to retry",
                self.name
            );
            return Err(SelectorError::HomingFailed {
                unit: self.name.clone(),
                moves: 0,
            });
        }

        let started = Instant::now();
        if !prep && !self.home.get() {
            if let Some(displacement) = last_commanded.filter(|d| *d != 0) {
                debug!("{} coarse return of {} toward home", self.name, -displacement);
                self.move_selector(
                    MoveCommand::new(
                        -f64::from(displacement),
                        self.settings.selector_speed,
                        self.settings.selector_accel,
                    )
                    .blocking(),
                )?;
            }
        }

        let budget = self.settings.geometry.homing_budget();
        let mut moves = 0u32;
        while !self.home.get() {
            if moves >= budget {
                return Err(self.fail_homing(moves));
            }
            self.move_selector(
                MoveCommand::new(CREEP_DISTANCE, CREEP_SPEED, CREEP_ACCEL).blocking(),
            )?;
            moves += 1;
        }

        if let Err(e) = self.selector.set_enabled(false) {
            warn!("{} failed to disable selector after homing: {}", self.name, e);
        }
        {
            let mut state = self.state.lock();
            state.selection = None;
            state.is_homed = true;
            state.prep_homed = true;
        }
        info!(
            creep_moves = moves,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "{} homed",
            self.name
        );
        Ok(())
    }

    fn fail_homing(&self, moves: u32) -> SelectorError {
        {
            let mut state = self.state.lock();
            state.invalidate();
            state.home_failed = true;
        }
        if let Err(e) = self.selector.set_enabled(false) {
            warn!("{} failed to disable selector: {}", self.name, e);
        }
        let message = format!("Failed to home {}", self.name);
        error!(creep_moves = moves, "{}", message);
        self.reporter.report(&message, false);
        SelectorError::HomingFailed {
            unit: self.name.clone(),
            moves,
        }
    }

    /// 发出选择器移动；失败时逻辑位置作废
    fn move_selector(&self, command: MoveCommand) -> Result<(), SelectorError> {
        self.selector.move_by(command).map_err(|e| {
            self.state.lock().invalidate();
            error!("{} selector move failed: {}", self.name, e);
            SelectorError::from(e)
        })
    }

    // ==================== 定位 ====================

    /// 将选择器移动到 `lane` 的 `position`
    ///
    /// 清除归零失败标志；切换通道（或位置未知）时先归零。
    pub fn move_to(
        &self,
        lane: &Arc<Lane>,
        position: SelectorPosition,
    ) -> Result<(), SelectorError> {
        if !self.lanes.iter().any(|own| Arc::ptr_eq(own, lane)) {
            return Err(SelectorError::UnknownLane {
                unit: self.name.clone(),
                lane: lane.name().to_string(),
            });
        }

        let needs_home = {
            let mut state = self.state.lock();
            state.home_failed = false;
            !state.is_selected(lane)
        };
        if needs_home {
            debug!("{} selecting {}, homing first", self.name, lane.name());
            self.home()?;
        }

        let target = self.settings.geometry.displacement(lane.index(), position);
        let origin = self.state.lock().last_commanded().unwrap_or(0);
        let delta = target - origin;
        if delta != 0 {
            self.move_selector(MoveCommand::new(
                f64::from(delta),
                self.settings.selector_speed,
                self.settings.selector_accel,
            ))?;
        }

        self.state.lock().selection = Some(Selection {
            lane: Arc::clone(lane),
            position,
            displacement: target,
        });
        debug!(
            delta,
            "{} selector at {} {} (displacement {})",
            self.name,
            lane.name(),
            position,
            target
        );
        Ok(())
    }

    /// 选中通道（LOAD 位置）
    pub fn select_lane(&self, lane: &Arc<Lane>) -> Result<(), SelectorError> {
        self.move_to(lane, SelectorPosition::Load)
    }

    /// 按通道编号显式定位（手动调试入口）
    ///
    /// 编号不存在时返回 `ExplicitMove::LaneNotFound`，不发出任何移动。
    /// 编号与位置的范围校验由命令层负责。
    pub fn set_position_explicit(
        &self,
        lane_index: u8,
        position: SelectorPosition,
    ) -> Result<ExplicitMove, SelectorError> {
        let Some(lane) = self.lane(lane_index).cloned() else {
            info!("{}: lane {} not found", self.name, lane_index);
            return Ok(ExplicitMove::LaneNotFound(lane_index));
        };
        self.move_to(&lane, position)?;
        Ok(ExplicitMove::Moved {
            lane: lane.name().to_string(),
            index: lane_index,
            position,
        })
    }

    /// 启动预检
    ///
    /// 从未完成过预检归零时执行一次跳过粗回位的归零，再运行 `base_check`，
    /// 最后再次归零。返回 `prep_homed && base_check 结果`。
    pub fn system_test<F>(&self, lane: &Arc<Lane>, base_check: F) -> bool
    where
        F: FnOnce(&Arc<Lane>) -> bool,
    {
        if !self.state.lock().prep_homed {
            if let Err(e) = self.home_inner(true) {
                warn!("{} prep homing failed: {}", self.name, e);
            }
        }
        let base_ok = base_check(lane);
        if let Err(e) = self.home() {
            warn!("{} homing after prep check failed: {}", self.name, e);
        }
        self.state.lock().prep_homed && base_ok
    }

    // ==================== 传感器 ====================

    /// 归零开关边沿
    pub fn on_home_edge(&self, state: bool) {
        trace!("{} home switch -> {}", self.name, state);
        self.home.set(state);
    }

    /// 公共张力开关边沿（只记录电平）
    pub fn on_common_tension_edge(&self, state: bool) {
        trace!("{} common tension -> {}", self.name, state);
        if let Some(level) = &self.common_tension {
            level.set(state);
        }
    }

    /// 归零开关当前电平
    pub fn home_switch(&self) -> bool {
        self.home.get()
    }

    /// 公共张力开关当前电平（未配置时为 `None`）
    pub fn common_tension(&self) -> Option<bool> {
        self.common_tension.as_ref().map(SwitchLevel::get)
    }

    // ==================== 断料判定 ====================

    /// 是否应触发断料处理
    ///
    /// `lane` 为打印机当前通道、正在打印、且通道不处于退料/校准状态时为 true。
    pub fn should_trigger_runout(&self, lane: &Lane) -> bool {
        let is_current = self.print.current_lane().as_deref() == Some(lane.name());
        is_current && self.print.is_printing() && !lane.state().suppresses_runout()
    }

    // ==================== 指示灯 ====================

    pub fn lane_loaded(&self, lane: &Lane) {
        self.set_indicator(lane, INDICATOR_ON);
    }

    pub fn lane_unloaded(&self, lane: &Lane) {
        self.set_indicator(lane, INDICATOR_OFF);
    }

    pub fn lane_loading(&self, lane: &Lane) {
        self.set_indicator(lane, INDICATOR_DIM);
    }

    fn set_indicator(&self, lane: &Lane, brightness: f32) {
        let Some(indicator) = &self.indicator else {
            trace!("{} has no lane indicators", self.name);
            return;
        };
        if let Err(e) = indicator.set_white(lane.index(), brightness) {
            debug!("Could not control LED for lane {}: {}", lane.index(), e);
        }
    }

    // ==================== 状态 ====================

    /// 单元状态快照
    pub fn status(&self) -> UnitStatus {
        let state = self.state.lock().clone();
        UnitStatus {
            name: self.name.clone(),
            homed: state.is_homed,
            home_failed: state.home_failed,
            home_switch: self.home.get(),
            common_tension: self.common_tension(),
            selected_lane: state.selected_lane().map(|lane| lane.name().to_string()),
            selected_position: state.selected_position(),
            lanes: self
                .lanes
                .iter()
                .map(|lane| LaneStatus {
                    name: lane.name().to_string(),
                    index: lane.index(),
                    state: lane.state(),
                })
                .collect(),
            show_sensors: self.settings.show_sensors,
        }
    }
}

impl SelectorUnit for AceUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_selector_position(
        &self,
        lane: &Arc<Lane>,
        position: SelectorPosition,
    ) -> Result<(), SelectorError> {
        self.move_to(lane, position)
    }

    fn drive_actuator(&self) -> Option<Arc<dyn Actuator>> {
        Some(Arc::clone(&self.drive))
    }
}
