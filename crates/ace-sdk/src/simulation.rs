//! 模拟硬件装配
//!
//! 为配置中的每个单元创建模拟选择器（驱动共享的归零开关）和模拟驱动电机，
//! 供命令行工具与集成测试在没有真实硬件时运行完整系统。

use crate::system::Hardware;
use ace_driver::mock::{
    MockActuator, MockIndicator, MockPrintMonitor, RecordingReporter, SimulatedSelector,
};
use ace_tools::AceConfig;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 模拟硬件句柄
#[derive(Debug, Default)]
pub struct Simulation {
    pub print: Arc<MockPrintMonitor>,
    pub reporter: Arc<RecordingReporter>,
    /// 按单元名称索引
    pub selectors: BTreeMap<String, Arc<SimulatedSelector>>,
    /// 按驱动电机名称索引
    pub drives: BTreeMap<String, Arc<MockActuator>>,
    /// 按单元名称索引
    pub indicators: BTreeMap<String, Arc<MockIndicator>>,
}

impl Simulation {
    /// 为 `config` 创建模拟硬件
    ///
    /// 选择器初始位于归零位。
    pub fn hardware(config: &AceConfig) -> (Hardware, Simulation) {
        let mut sim = Simulation {
            print: Arc::new(MockPrintMonitor::new()),
            reporter: Arc::new(RecordingReporter::new()),
            ..Simulation::default()
        };
        let mut hardware = Hardware::new(sim.print.clone()).with_reporter(sim.reporter.clone());

        for (name, unit) in &config.unit {
            let home = hardware.switch(&unit.home_pin);
            let selector = Arc::new(SimulatedSelector::new(
                unit.selector_stepper.as_str(),
                home,
                0.0,
            ));
            let drive = sim
                .drives
                .entry(unit.drive_stepper.clone())
                .or_insert_with(|| Arc::new(MockActuator::new(unit.drive_stepper.as_str())))
                .clone();
            let indicator = Arc::new(MockIndicator::new());

            hardware = hardware
                .with_actuator(unit.selector_stepper.as_str(), selector.clone())
                .with_actuator(unit.drive_stepper.as_str(), drive)
                .with_indicator(name.as_str(), indicator.clone());
            sim.selectors.insert(name.clone(), selector);
            sim.indicators.insert(name.clone(), indicator);
        }
        (hardware, sim)
    }

    /// 单元的模拟选择器
    pub fn selector(&self, unit: &str) -> Option<&Arc<SimulatedSelector>> {
        self.selectors.get(unit)
    }

    /// 模拟驱动电机
    pub fn drive(&self, name: &str) -> Option<&Arc<MockActuator>> {
        self.drives.get(name)
    }
}
