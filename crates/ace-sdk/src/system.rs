//! 系统装配
//!
//! 根据 [`AceConfig`] 创建所有单元、通道与张力辅助控制器，
//! 把传感器引脚接入事件循环，并注册命令接口。
//!
//! 所有协作对象（执行器、开关、宿主服务）都通过 [`Hardware`] 显式注入。

use ace_client::control::{TensionAssist, TensionSettings};
use ace_client::{
    AceUnit, ActuatorMap, BuildError, CommandDispatcher, CommandError, CommandResponse, Lane,
    Reactor, SensorRouter, SensorTarget, TensionStatus, UnitBuilder, UnitSettings, UnitStatus,
};
use ace_driver::{
    Actuator, ErrorReporter, EventSender, Indicator, LogReporter, PrintMonitor, SwitchLevel,
};
use ace_tools::{AceConfig, ConfigError};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// 系统装配/运行错误
#[derive(Error, Debug)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("Lane '{0}' not found")]
    UnknownLane(String),
}

/// 硬件与宿主服务
///
/// 开关电平按引脚名称共享：IO 侧（或模拟执行器）与状态机读写同一个 [`SwitchLevel`]。
pub struct Hardware {
    actuators: ActuatorMap,
    print: Arc<dyn PrintMonitor>,
    reporter: Arc<dyn ErrorReporter>,
    indicators: BTreeMap<String, Arc<dyn Indicator>>,
    switches: BTreeMap<String, SwitchLevel>,
}

impl Hardware {
    /// 创建硬件表（错误默认只写日志）
    pub fn new(print: Arc<dyn PrintMonitor>) -> Self {
        Self {
            actuators: ActuatorMap::new(),
            print,
            reporter: Arc::new(LogReporter),
            indicators: BTreeMap::new(),
            switches: BTreeMap::new(),
        }
    }

    /// 注册执行器（名称与配置中的 `*_stepper` 对应）
    pub fn with_actuator(mut self, name: impl Into<String>, actuator: Arc<dyn Actuator>) -> Self {
        self.actuators.insert(name.into(), actuator);
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// 为单元注册通道指示灯
    pub fn with_indicator(mut self, unit: impl Into<String>, indicator: Arc<dyn Indicator>) -> Self {
        self.indicators.insert(unit.into(), indicator);
        self
    }

    /// 引脚对应的开关电平（不存在时创建）
    pub fn switch(&mut self, pin: &str) -> SwitchLevel {
        self.switches.entry(pin.to_string()).or_default().clone()
    }

    pub fn actuators(&self) -> &ActuatorMap {
        &self.actuators
    }
}

/// 系统状态快照
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SystemStatus {
    pub units: Vec<UnitStatus>,
    pub tensions: Vec<TensionStatus>,
}

/// 已装配的 ACE 系统
pub struct AceSystem {
    units: BTreeMap<String, Arc<AceUnit>>,
    tensions: BTreeMap<String, Arc<TensionAssist>>,
    lanes: BTreeMap<String, Arc<Lane>>,
    /// 通道名称 -> 张力控制器名称
    lane_tension: BTreeMap<String, String>,
    dispatcher: CommandDispatcher,
    reactor: Reactor,
}

impl std::fmt::Debug for AceSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AceSystem")
            .field("units", &self.units.keys().collect::<Vec<_>>())
            .field("tensions", &self.tensions.keys().collect::<Vec<_>>())
            .field("lanes", &self.lanes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AceSystem {
    /// 从配置装配系统
    ///
    /// 配置先经过校验；引用的执行器不存在时返回 `BuildError::MissingActuator`。
    pub fn from_config(config: &AceConfig, hardware: &mut Hardware) -> Result<Self, SystemError> {
        config.validate()?;
        let global_show = config.enable_sensors_in_gui;
        let mut router = SensorRouter::new();
        let mut dispatcher = CommandDispatcher::new();

        let mut units = BTreeMap::new();
        let mut lanes = BTreeMap::new();
        for (name, unit_config) in &config.unit {
            let settings = UnitSettings {
                geometry: unit_config.geometry(),
                selector_speed: unit_config.selector_speed,
                selector_accel: unit_config.selector_accel,
                show_sensors: unit_config.show_sensors(global_show),
            };
            let mut builder = UnitBuilder::new(name.as_str())
                .settings(settings)
                .drive_stepper(unit_config.drive_stepper.as_str())
                .selector_stepper(unit_config.selector_stepper.as_str())
                .home_switch(hardware.switch(&unit_config.home_pin))
                .print_monitor(Arc::clone(&hardware.print))
                .error_reporter(Arc::clone(&hardware.reporter));
            if let Some(pin) = &unit_config.tension_common_pin {
                builder = builder.common_tension_switch(hardware.switch(pin));
            }
            if let Some(indicator) = hardware.indicators.get(name) {
                builder = builder.indicator(Arc::clone(indicator));
            }
            for (lane, lane_config) in config.lanes_of(name) {
                builder = builder.lane(lane, lane_config.index);
            }

            let unit = builder.build(&hardware.actuators)?;
            router.register(
                unit_config.home_pin.as_str(),
                SensorTarget::Home(Arc::clone(&unit)),
            );
            if let Some(pin) = &unit_config.tension_common_pin {
                router.register(pin.as_str(), SensorTarget::CommonTension(Arc::clone(&unit)));
            }
            for lane in unit.lanes() {
                lanes.insert(lane.name().to_string(), Arc::clone(lane));
            }
            dispatcher.register_unit(Arc::clone(&unit));
            debug!(lanes = unit.lanes().len(), "Unit {} assembled", name);
            units.insert(name.clone(), unit);
        }

        let mut tensions = BTreeMap::new();
        for (name, tension_config) in &config.tension {
            let settings = TensionSettings {
                assist_mode: tension_config.assist_mode,
                feed_length: tension_config.tension_feed_length,
                feed_speed: tension_config.tension_feed_speed,
                feed_accel: tension_config.tension_feed_accel,
                hub_retract_distance: tension_config.hub_retract_distance,
                debug: tension_config.debug,
                show_sensors: tension_config.show_sensors(global_show),
                ..TensionSettings::default()
            };
            let assist = Arc::new(TensionAssist::new(
                name.as_str(),
                settings,
                Arc::clone(&hardware.print),
            ));
            router.register(
                tension_config.tension_pin.as_str(),
                SensorTarget::Tension(Arc::clone(&assist)),
            );
            dispatcher.register_tension(Arc::clone(&assist));
            tensions.insert(name.clone(), assist);
        }

        let lane_tension = config
            .lane
            .iter()
            .filter_map(|(lane, cfg)| cfg.tension.clone().map(|t| (lane.clone(), t)))
            .collect();

        info!(
            "ACE system ready: {} units, {} lanes, {} tension controllers",
            units.len(),
            lanes.len(),
            tensions.len()
        );

        Ok(Self {
            units,
            tensions,
            lanes,
            lane_tension,
            dispatcher,
            reactor: Reactor::new(router),
        })
    }

    pub fn unit(&self, name: &str) -> Option<&Arc<AceUnit>> {
        self.units.get(name)
    }

    pub fn units(&self) -> impl Iterator<Item = &Arc<AceUnit>> {
        self.units.values()
    }

    pub fn tension(&self, name: &str) -> Option<&Arc<TensionAssist>> {
        self.tensions.get(name)
    }

    pub fn tensions(&self) -> impl Iterator<Item = &Arc<TensionAssist>> {
        self.tensions.values()
    }

    pub fn lane(&self, name: &str) -> Option<&Arc<Lane>> {
        self.lanes.get(name)
    }

    pub fn lanes(&self) -> impl Iterator<Item = &Arc<Lane>> {
        self.lanes.values()
    }

    /// 通道开始使用：绑定到配置的张力控制器
    ///
    /// 返回被绑定的控制器名称（通道未配置控制器时为 `None`）。
    pub fn activate_lane(&self, lane: &str) -> Result<Option<&str>, SystemError> {
        let handle = self
            .lanes
            .get(lane)
            .ok_or_else(|| SystemError::UnknownLane(lane.to_string()))?;
        let Some(tension) = self.lane_tension.get(lane) else {
            return Ok(None);
        };
        if let Some(assist) = self.tensions.get(tension) {
            assist.set_current_lane(Some(Arc::clone(handle)));
        }
        Ok(Some(tension.as_str()))
    }

    /// 通道停止使用：解除张力控制器绑定
    pub fn release_lane(&self, lane: &str) -> Result<(), SystemError> {
        if !self.lanes.contains_key(lane) {
            return Err(SystemError::UnknownLane(lane.to_string()));
        }
        let assist = self
            .lane_tension
            .get(lane)
            .and_then(|tension| self.tensions.get(tension));
        if let Some(assist) = assist {
            let bound = assist
                .current_lane()
                .is_some_and(|current| current.name() == lane);
            if bound {
                assist.set_current_lane(None);
            }
        }
        Ok(())
    }

    /// 执行一行命令
    pub fn execute(&self, line: &str) -> Result<CommandResponse, CommandError> {
        self.dispatcher.execute(line)
    }

    /// 传感器事件发送端（交给 IO 侧）
    pub fn sensor_sender(&self) -> EventSender {
        self.reactor.sender()
    }

    /// 处理所有排队的传感器事件
    pub fn run_pending(&self) -> usize {
        self.reactor.run_pending()
    }

    /// 等待并处理一个传感器事件
    pub fn run_once(&self, timeout: Duration) -> bool {
        self.reactor.run_once(timeout)
    }

    /// 状态快照
    pub fn status(&self) -> SystemStatus {
        SystemStatus {
            units: self.units.values().map(|unit| unit.status()).collect(),
            tensions: self.tensions.values().map(|t| t.status()).collect(),
        }
    }
}
