//! 模拟硬件
//!
//! 用于测试和演示的执行器、打印状态、错误上报与指示灯模拟实现。
//! 仅在 `cfg(test)` 或启用 `mock` feature 时编译。

use crate::actuator::{Actuator, MoveCommand};
use crate::error::DriverError;
use crate::host::{ErrorReporter, Indicator, PrintMonitor};
use crate::switch::SwitchLevel;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// 记录所有命令的模拟执行器
///
/// 用作共享驱动电机，或用于只关心命令序列的选择器测试。
#[derive(Debug, Default)]
pub struct MockActuator {
    name: String,
    moves: Mutex<Vec<MoveCommand>>,
    enabled: AtomicBool,
    disable_calls: AtomicUsize,
    fail_moves: AtomicBool,
}

impl MockActuator {
    /// 创建模拟执行器
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 让后续移动全部失败（模拟驱动器故障）
    pub fn set_failing(&self, failing: bool) {
        self.fail_moves.store(failing, Ordering::Release);
    }

    /// 已执行的移动命令
    pub fn moves(&self) -> Vec<MoveCommand> {
        self.moves.lock().clone()
    }

    /// 已执行移动的位移序列
    pub fn distances(&self) -> Vec<f64> {
        self.moves.lock().iter().map(|m| m.distance).collect()
    }

    /// 取出并清空移动记录
    pub fn take_moves(&self) -> Vec<MoveCommand> {
        std::mem::take(&mut *self.moves.lock())
    }

    /// 是否处于使能状态
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// 失能调用次数
    pub fn disable_calls(&self) -> usize {
        self.disable_calls.load(Ordering::Acquire)
    }
}

impl Actuator for MockActuator {
    fn name(&self) -> &str {
        &self.name
    }

    fn move_by(&self, command: MoveCommand) -> Result<(), DriverError> {
        command.validate(&self.name)?;
        if self.fail_moves.load(Ordering::Acquire) {
            return Err(DriverError::ActuatorFault {
                name: self.name.clone(),
                reason: "simulated fault".to_string(),
            });
        }
        // 移动会隐式使能电机
        self.enabled.store(true, Ordering::Release);
        self.moves.lock().push(command);
        Ok(())
    }

    fn set_enabled(&self, enabled: bool) -> Result<(), DriverError> {
        if !enabled {
            self.disable_calls.fetch_add(1, Ordering::AcqRel);
        }
        self.enabled.store(enabled, Ordering::Release);
        Ok(())
    }
}

/// 模拟选择器机构
///
/// 跟踪选择器的物理位置，并在位置回到归零参考点时驱动归零开关电平。
/// 归零开关在 `|position| < 0.5` 时触发。
#[derive(Debug)]
pub struct SimulatedSelector {
    inner: MockActuator,
    position: Mutex<f64>,
    home: SwitchLevel,
    home_broken: AtomicBool,
}

impl SimulatedSelector {
    /// 创建模拟选择器（初始物理位置 `position`）
    pub fn new(name: impl Into<String>, home: SwitchLevel, position: f64) -> Self {
        let selector = Self {
            inner: MockActuator::new(name),
            position: Mutex::new(position),
            home,
            home_broken: AtomicBool::new(false),
        };
        selector.update_home(position);
        selector
    }

    /// 模拟归零开关损坏（永远不触发）
    pub fn break_home_switch(&self) {
        self.home_broken.store(true, Ordering::Release);
        self.home.set(false);
    }

    /// 当前物理位置
    pub fn position(&self) -> f64 {
        *self.position.lock()
    }

    /// 强制设置物理位置（模拟手动拨动/丢步）
    pub fn set_position(&self, position: f64) {
        *self.position.lock() = position;
        self.update_home(position);
    }

    /// 已执行的移动命令
    pub fn moves(&self) -> Vec<MoveCommand> {
        self.inner.moves()
    }

    /// 已执行移动的位移序列
    pub fn distances(&self) -> Vec<f64> {
        self.inner.distances()
    }

    /// 取出并清空移动记录
    pub fn take_moves(&self) -> Vec<MoveCommand> {
        self.inner.take_moves()
    }

    /// 是否处于使能状态
    pub fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    /// 失能调用次数
    pub fn disable_calls(&self) -> usize {
        self.inner.disable_calls()
    }

    fn update_home(&self, position: f64) {
        let at_home = !self.home_broken.load(Ordering::Acquire) && position.abs() < 0.5;
        self.home.set(at_home);
    }
}

impl Actuator for SimulatedSelector {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn move_by(&self, command: MoveCommand) -> Result<(), DriverError> {
        self.inner.move_by(command)?;
        let position = {
            let mut position = self.position.lock();
            *position += command.distance;
            *position
        };
        self.update_home(position);
        Ok(())
    }

    fn set_enabled(&self, enabled: bool) -> Result<(), DriverError> {
        self.inner.set_enabled(enabled)
    }
}

/// 模拟打印状态
#[derive(Debug, Default)]
pub struct MockPrintMonitor {
    ready: AtomicBool,
    printing: AtomicBool,
    paused: AtomicBool,
    toolchange: AtomicBool,
    current_lane: Mutex<Option<String>>,
}

impl MockPrintMonitor {
    /// 创建就绪但未打印的宿主状态
    pub fn new() -> Self {
        let monitor = Self::default();
        monitor.set_ready(true);
        monitor
    }

    /// 创建正在使用 `lane` 打印的宿主状态
    pub fn printing_with(lane: impl Into<String>) -> Self {
        let monitor = Self::new();
        monitor.set_printing(true);
        monitor.set_current_lane(Some(lane.into()));
        monitor
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub fn set_printing(&self, printing: bool) {
        self.printing.store(printing, Ordering::Release);
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    pub fn set_toolchange(&self, toolchange: bool) {
        self.toolchange.store(toolchange, Ordering::Release);
    }

    pub fn set_current_lane(&self, lane: Option<String>) {
        *self.current_lane.lock() = lane;
    }
}

impl PrintMonitor for MockPrintMonitor {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn is_printing(&self) -> bool {
        self.printing.load(Ordering::Acquire)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    fn in_toolchange(&self) -> bool {
        self.toolchange.load(Ordering::Acquire)
    }

    fn current_lane(&self) -> Option<String> {
        self.current_lane.lock().clone()
    }
}

/// 记录所有上报消息的错误上报器
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<(String, bool)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已上报的消息
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().iter().map(|(m, _)| m.clone()).collect()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, message: &str, pause: bool) {
        self.messages.lock().push((message.to_string(), pause));
    }
}

/// 模拟通道指示灯
///
/// 未安装的通道（`without`）设置时返回 `IndicatorNotFound`。
#[derive(Debug, Default)]
pub struct MockIndicator {
    levels: Mutex<BTreeMap<u8, f32>>,
    missing: BTreeSet<u8>,
}

impl MockIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定没有安装指示灯的通道
    pub fn without(lanes: impl IntoIterator<Item = u8>) -> Self {
        Self {
            levels: Mutex::new(BTreeMap::new()),
            missing: lanes.into_iter().collect(),
        }
    }

    /// 通道指示灯当前亮度
    pub fn level(&self, lane_index: u8) -> Option<f32> {
        self.levels.lock().get(&lane_index).copied()
    }
}

impl Indicator for MockIndicator {
    fn set_white(&self, lane_index: u8, brightness: f32) -> Result<(), DriverError> {
        if self.missing.contains(&lane_index) {
            return Err(DriverError::IndicatorNotFound(lane_index));
        }
        self.levels.lock().insert(lane_index, brightness);
        Ok(())
    }
}
