//! Builder 模式实现
//!
//! 链式装配 `AceUnit`，在 `build` 时按名称解析执行器引用。

use super::machine::{AceUnit, SelectorState, UnitSettings};
use super::SelectorUnit;
use crate::error::BuildError;
use crate::lane::Lane;
use ace_driver::{Actuator, ErrorReporter, Indicator, LogReporter, PrintMonitor, SwitchLevel};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use tracing::debug;

/// 按名称索引的执行器表
pub type ActuatorMap = BTreeMap<String, Arc<dyn Actuator>>;

/// 单元 Builder（链式构造）
///
/// # Example
///
/// ```rust
/// use ace_client::{ActuatorMap, UnitBuilder};
/// use ace_driver::mock::{MockActuator, MockPrintMonitor};
/// use std::sync::Arc;
///
/// let mut actuators = ActuatorMap::new();
/// actuators.insert("ace_drive".to_string(), Arc::new(MockActuator::new("ace_drive")));
/// actuators.insert("ace_selector".to_string(), Arc::new(MockActuator::new("ace_selector")));
///
/// let unit = UnitBuilder::new("ACE_1")
///     .drive_stepper("ace_drive")
///     .selector_stepper("ace_selector")
///     .lane("lane1", 1)
///     .lane("lane2", 2)
///     .print_monitor(Arc::new(MockPrintMonitor::new()))
///     .build(&actuators)
///     .unwrap();
/// assert_eq!(unit.lanes().len(), 2);
/// ```
pub struct UnitBuilder {
    name: String,
    settings: UnitSettings,
    drive_stepper: Option<String>,
    selector_stepper: Option<String>,
    home: SwitchLevel,
    common_tension: Option<SwitchLevel>,
    lanes: Vec<(String, u8)>,
    print: Option<Arc<dyn PrintMonitor>>,
    reporter: Arc<dyn ErrorReporter>,
    indicator: Option<Arc<dyn Indicator>>,
}

impl UnitBuilder {
    /// 创建新的 Builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: UnitSettings::default(),
            drive_stepper: None,
            selector_stepper: None,
            home: SwitchLevel::default(),
            common_tension: None,
            lanes: Vec::new(),
            print: None,
            reporter: Arc::new(LogReporter),
            indicator: None,
        }
    }

    /// 设置运行参数
    pub fn settings(mut self, settings: UnitSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 共享驱动电机名称
    pub fn drive_stepper(mut self, name: impl Into<String>) -> Self {
        self.drive_stepper = Some(name.into());
        self
    }

    /// 选择器电机名称
    pub fn selector_stepper(mut self, name: impl Into<String>) -> Self {
        self.selector_stepper = Some(name.into());
        self
    }

    /// 归零开关电平（与 IO 侧共享）
    pub fn home_switch(mut self, level: SwitchLevel) -> Self {
        self.home = level;
        self
    }

    /// 公共张力开关电平（可选）
    pub fn common_tension_switch(mut self, level: SwitchLevel) -> Self {
        self.common_tension = Some(level);
        self
    }

    /// 添加通道
    pub fn lane(mut self, name: impl Into<String>, index: u8) -> Self {
        self.lanes.push((name.into(), index));
        self
    }

    /// 打印状态查询（必需）
    pub fn print_monitor(mut self, print: Arc<dyn PrintMonitor>) -> Self {
        self.print = Some(print);
        self
    }

    /// 错误上报器（默认只写日志）
    pub fn error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// 通道指示灯
    pub fn indicator(mut self, indicator: Arc<dyn Indicator>) -> Self {
        self.indicator = Some(indicator);
        self
    }

    /// 构建单元
    ///
    /// # 错误
    ///
    /// - `BuildError::MissingActuator`：驱动/选择器电机名称在 `actuators` 中不存在
    /// - `BuildError::MissingComponent`：未设置电机名称或打印状态查询
    /// - `BuildError::InvalidLaneLayout`：通道编号不是从 1 开始的连续编号
    /// - `BuildError::InvalidGeometry`：间距参数为 0 或超过 [`MAX_STEPS`](ace_protocol::geometry::MAX_STEPS)
    pub fn build(self, actuators: &ActuatorMap) -> Result<Arc<AceUnit>, BuildError> {
        self.settings
            .geometry
            .validate()
            .map_err(|source| BuildError::InvalidGeometry {
                unit: self.name.clone(),
                source,
            })?;
        let drive = self.resolve("drive_stepper", self.drive_stepper.as_deref(), actuators)?;
        let selector =
            self.resolve("selector_stepper", self.selector_stepper.as_deref(), actuators)?;
        let print = self.print.clone().ok_or_else(|| BuildError::MissingComponent {
            unit: self.name.clone(),
            component: "print monitor",
        })?;
        let lanes = self.validated_lanes()?;

        debug!(
            lanes = lanes.len(),
            "Building unit {} (drive {}, selector {})",
            self.name,
            drive.name(),
            selector.name()
        );

        let UnitBuilder {
            name,
            settings,
            home,
            common_tension,
            reporter,
            indicator,
            ..
        } = self;

        Ok(Arc::new_cyclic(|weak: &Weak<AceUnit>| {
            let unit: Weak<dyn SelectorUnit> = weak.clone();
            let lanes = lanes
                .into_iter()
                .map(|(lane, index)| Arc::new(Lane::attached(lane, index, unit.clone())))
                .collect();
            AceUnit {
                name,
                settings,
                selector,
                drive,
                home,
                common_tension,
                lanes,
                print,
                reporter,
                indicator,
                state: Mutex::new(SelectorState::default()),
            }
        }))
    }

    fn resolve(
        &self,
        role: &'static str,
        actuator: Option<&str>,
        actuators: &ActuatorMap,
    ) -> Result<Arc<dyn Actuator>, BuildError> {
        let actuator = actuator.ok_or_else(|| BuildError::MissingComponent {
            unit: self.name.clone(),
            component: role,
        })?;
        actuators
            .get(actuator)
            .cloned()
            .ok_or_else(|| BuildError::MissingActuator {
                role,
                actuator: actuator.to_string(),
                unit: self.name.clone(),
            })
    }

    /// 通道按编号排序，编号必须为 1..=N
    fn validated_lanes(&self) -> Result<Vec<(String, u8)>, BuildError> {
        let mut lanes = self.lanes.clone();
        lanes.sort_by_key(|(_, index)| *index);
        for (expected, (lane, index)) in (1u8..).zip(&lanes) {
            if *index != expected {
                return Err(BuildError::InvalidLaneLayout {
                    unit: self.name.clone(),
                    reason: format!("lane '{}' has index {}, expected {}", lane, index, expected),
                });
            }
        }
        Ok(lanes)
    }
}
