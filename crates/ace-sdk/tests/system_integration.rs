//! 系统装配集成测试
//!
//! 从 TOML 配置装配完整系统（模拟硬件），验证：
//! - 单元/通道/控制器装配与状态快照
//! - 执行器缺失时的装配错误
//! - 命令接口驱动选择器定位与归零
//! - 传感器引脚路由

mod common;

use ace_sdk::AceConfig;
use ace_sdk::driver::SensorEvent;
use ace_sdk::prelude::*;
use ace_sdk::simulation::Simulation;
use common::{CONFIG, assemble, config};
use std::sync::Arc;
use std::time::Instant;

#[test]
fn test_assembles_units_lanes_and_controllers() {
    let (system, _sim) = assemble();

    assert_eq!(system.units().count(), 2);
    assert_eq!(system.lanes().count(), 6);
    assert_eq!(system.tensions().count(), 2);

    let unit = system.unit("ACE_2").unwrap();
    assert_eq!(unit.settings().geometry, SelectorGeometry::new(80, 40));
    let names: Vec<_> = unit.lanes().iter().map(|lane| lane.name()).collect();
    assert_eq!(names, vec!["lane5", "lane6"]);

    let lane3 = system.lane("lane3").unwrap();
    assert_eq!(lane3.index(), 3);
    assert_eq!(lane3.unit_name().as_deref(), Some("ACE_1"));

    let status = system.status();
    assert_eq!(status.units.len(), 2);
    assert!(status.units.iter().all(|unit| unit.show_sensors));
    assert_eq!(status.units[0].common_tension, Some(false));
    assert_eq!(status.units[1].common_tension, None);
    assert_eq!(status.tensions[1].mode, AssistMode::Active);
}

#[test]
fn test_assembles_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ace.toml");
    std::fs::write(&path, CONFIG).unwrap();

    let config = AceConfig::load(&path).unwrap();
    let (mut hardware, _sim) = Simulation::hardware(&config);
    let system = AceSystem::from_config(&config, &mut hardware).unwrap();
    assert_eq!(system.lanes().count(), 6);
}

#[test]
fn test_dangling_lane_reference_is_rejected() {
    let mut config = config();
    config.lane.get_mut("lane6").unwrap().unit = "ACE_3".to_string();

    let (mut hardware, _sim) = Simulation::hardware(&config);
    assert!(matches!(
        AceSystem::from_config(&config, &mut hardware),
        Err(SystemError::Config(ConfigError::UnknownReference { .. }))
    ));
}

#[test]
fn test_missing_drive_actuator_is_fatal() {
    let config = config();
    let mut hardware = Hardware::new(Arc::new(ace_sdk::driver::mock::MockPrintMonitor::new()))
        .with_actuator(
            "ace_selector",
            Arc::new(ace_sdk::driver::mock::MockActuator::new("ace_selector")),
        );

    let err = AceSystem::from_config(&config, &mut hardware).unwrap_err();
    assert_eq!(
        err.to_string(),
        "No config found for drive_stepper: ace_drive in [AFC_ACE ACE_1]. \
         Please make sure [AFC_stepper ace_drive] section exists in your config"
    );
}

#[test]
fn test_set_position_commands_drive_selector() {
    let (system, sim) = assemble();
    let selector = sim.selector("ACE_1").unwrap();

    let response = system
        .execute("ACE_SET_POSITION UNIT=ACE_1 LANE=3 POSITION=1")
        .unwrap();
    assert_eq!(response.to_string(), "Moved to lane 3, position 1");
    assert_eq!(selector.distances(), vec![250.0]);

    // 切换通道：粗回位到归零位，再定位
    selector.take_moves();
    system
        .execute("ACE_SET_POSITION UNIT=ACE_1 LANE=2 POSITION=2")
        .unwrap();
    assert_eq!(selector.distances(), vec![-250.0, 50.0]);
    assert_eq!(selector.position(), 50.0);

    // 同通道：相对修正
    selector.take_moves();
    system
        .execute("ACE_SET_POSITION UNIT=ACE_1 LANE=2 POSITION=0")
        .unwrap();
    assert_eq!(selector.distances(), vec![50.0]);

    let status = &system.status().units[0];
    assert_eq!(status.selected_lane.as_deref(), Some("lane2"));
    assert_eq!(status.selected_position, Some(SelectorPosition::Free));

    // 另一个单元不受影响
    assert!(sim.selector("ACE_2").unwrap().moves().is_empty());
}

#[test]
fn test_unknown_lane_and_unit() {
    let (system, sim) = assemble();
    let response = system
        .execute("ACE_SET_POSITION UNIT=ACE_2 LANE=3 POSITION=0")
        .unwrap();
    assert_eq!(response.to_string(), "Lane 3 not found");
    assert!(sim.selector("ACE_2").unwrap().moves().is_empty());

    assert!(matches!(
        system.execute("HOME_UNIT UNIT=ACE_7"),
        Err(CommandError::UnknownTarget { .. })
    ));
}

#[test]
fn test_homing_after_drift() {
    let (system, sim) = assemble();
    let selector = sim.selector("ACE_2").unwrap();
    selector.set_position(12.0);

    system.execute("HOME_UNIT UNIT=ACE_2").unwrap();
    assert_eq!(selector.moves().len(), 12);
    assert_eq!(selector.position(), 0.0);
    assert!(!selector.is_enabled());
    assert!(system.unit("ACE_2").unwrap().state().is_homed());
}

#[test]
fn test_homing_failure_is_reported_and_sticky() {
    let (system, sim) = assemble();
    let selector = sim.selector("ACE_2").unwrap();
    selector.set_position(5.0);
    selector.break_home_switch();

    let err = system.execute("HOME_UNIT UNIT=ACE_2").unwrap_err();
    assert!(matches!(
        err,
        CommandError::Selector(SelectorError::HomingFailed { moves: 400, .. })
    ));
    assert_eq!(sim.reporter.messages(), vec!["Failed to home ACE_2".to_string()]);
    assert!(system.status().units[1].home_failed);

    // 失败标志未清除前不再尝试
    selector.take_moves();
    assert!(system.execute("HOME_UNIT UNIT=ACE_2").is_err());
    assert!(selector.moves().is_empty());
}

#[test]
fn test_sensor_edges_are_routed_by_pin() {
    let (system, _sim) = assemble();
    let sender = system.sensor_sender();
    let now = Instant::now();

    sender.publish(SensorEvent::new("PA6", true, now)).unwrap();
    sender.publish(SensorEvent::new("PB1", true, now)).unwrap();
    sender.publish(SensorEvent::new("PZ0", true, now)).unwrap();
    assert_eq!(system.run_pending(), 3);

    assert_eq!(system.unit("ACE_1").unwrap().common_tension(), Some(true));
    assert!(system.tension("ACE_tension1").unwrap().tension_level());
    assert!(!system.tension("ACE_tension2").unwrap().tension_level());
}

#[test]
fn test_home_edge_updates_switch() {
    let (system, _sim) = assemble();
    let unit = system.unit("ACE_1").unwrap();
    assert!(unit.home_switch());

    system
        .sensor_sender()
        .publish(SensorEvent::new("PA1", false, Instant::now()))
        .unwrap();
    system.run_pending();
    assert!(!unit.home_switch());
}

#[test]
fn test_runout_predicate_follows_print_state() {
    let (system, sim) = assemble();
    let unit = system.unit("ACE_1").unwrap();
    let lane2 = system.lane("lane2").unwrap();

    sim.print.set_current_lane(Some("lane2".to_string()));
    sim.print.set_printing(true);
    assert!(unit.should_trigger_runout(lane2));

    lane2.set_state(LaneState::Ejecting);
    assert!(!unit.should_trigger_runout(lane2));
}

#[test]
fn test_lane_indicators() {
    let (system, sim) = assemble();
    let unit = system.unit("ACE_1").unwrap();
    let lane4 = system.lane("lane4").unwrap();
    let indicator = sim.indicators.get("ACE_1").unwrap();

    unit.lane_loading(lane4);
    assert_eq!(indicator.level(4), Some(0.3));
    unit.lane_loaded(lane4);
    assert_eq!(indicator.level(4), Some(1.0));
    unit.lane_unloaded(lane4);
    assert_eq!(indicator.level(4), Some(0.0));
}

#[test]
fn test_simulation_shares_drive_by_name() {
    let config = config();
    let (hardware, sim) = Simulation::hardware(&config);
    assert_eq!(sim.drives.len(), 2);
    assert_eq!(hardware.actuators().len(), 4);
}

#[cfg(feature = "serde")]
#[test]
fn test_status_serializes_to_json() {
    let (system, _sim) = assemble();
    system.activate_lane("lane3").unwrap();

    let json = serde_json::to_value(system.status()).unwrap();
    assert_eq!(json["units"][0]["name"], "ACE_1");
    assert_eq!(json["units"][0]["homed"], false);
    assert_eq!(json["tensions"][1]["mode"], "active");
    assert_eq!(json["tensions"][1]["current_lane"], "lane3");
    assert_eq!(json["tensions"][1]["buffer_status"], "Disabled");
}
