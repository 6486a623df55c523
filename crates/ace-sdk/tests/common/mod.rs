//! 集成测试公共配置

#![allow(dead_code)]

use ace_sdk::simulation::Simulation;
use ace_sdk::{AceConfig, AceSystem};

pub const CONFIG: &str = r#"
enable_sensors_in_gui = true

[unit.ACE_1]
drive_stepper = "ace_drive"
selector_stepper = "ace_selector"
home_pin = "PA1"
tension_common_pin = "PA6"

[unit.ACE_2]
drive_stepper = "ace2_drive"
selector_stepper = "ace2_selector"
home_pin = "PC1"
steps_per_lane = 80
steps_per_position = 40

[lane.lane1]
unit = "ACE_1"
index = 1
tension = "ACE_tension1"

[lane.lane2]
unit = "ACE_1"
index = 2
tension = "ACE_tension1"

[lane.lane3]
unit = "ACE_1"
index = 3
tension = "ACE_tension2"

[lane.lane4]
unit = "ACE_1"
index = 4

[lane.lane5]
unit = "ACE_2"
index = 1

[lane.lane6]
unit = "ACE_2"
index = 2

[tension.ACE_tension1]
tension_pin = "PB1"

[tension.ACE_tension2]
tension_pin = "PB2"
assist_mode = "active"
debug = true
"#;

pub fn config() -> AceConfig {
    AceConfig::from_toml_str(CONFIG).unwrap()
}

/// 装配带模拟硬件的系统
pub fn assemble() -> (AceSystem, Simulation) {
    let config = config();
    let (mut hardware, sim) = Simulation::hardware(&config);
    let system = AceSystem::from_config(&config, &mut hardware).unwrap();
    (system, sim)
}
