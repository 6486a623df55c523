//! # 配置文件
//!
//! ACE 单元、通道与张力辅助控制器的 TOML 配置。
//!
//! ```toml
//! enable_sensors_in_gui = false
//!
//! [unit.ACE_1]
//! drive_stepper = "ace_drive"
//! selector_stepper = "ace_selector"
//! home_pin = "PA1"
//! tension_common_pin = "PA6"
//! steps_per_lane = 100
//! steps_per_position = 50
//!
//! [lane.lane1]
//! unit = "ACE_1"
//! index = 1
//! tension = "ACE_tension1"
//!
//! [tension.ACE_tension1]
//! tension_pin = "PB1"
//! assist_mode = "active"
//! ```

use ace_protocol::geometry::MAX_STEPS;
use ace_protocol::{AssistMode, SelectorGeometry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Configuration defines no [unit.*] sections")]
    NoUnits,
    #[error("Invalid value for {field} in [{section}]: {reason}")]
    Invalid {
        section: String,
        field: &'static str,
        reason: String,
    },
    #[error("[{section}] {field} refers to unknown section [{target}]")]
    UnknownReference {
        section: String,
        field: &'static str,
        target: String,
    },
    #[error("Invalid lane layout for [unit.{unit}]: {reason}")]
    LaneLayout { unit: String, reason: String },
}

// ==================== 默认值 ====================

fn default_steps_per_lane() -> u32 {
    100
}

fn default_steps_per_position() -> u32 {
    50
}

fn default_selector_speed() -> f64 {
    50.0
}

fn default_selector_accel() -> f64 {
    50.0
}

fn default_feed_length() -> f64 {
    10.0
}

fn default_feed_speed() -> f64 {
    50.0
}

fn default_feed_accel() -> f64 {
    400.0
}

fn default_hub_retract_distance() -> f64 {
    20.0
}

// ==================== 配置结构 ====================

/// 完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AceConfig {
    /// 全局默认：是否在界面中显示传感器
    #[serde(default)]
    pub enable_sensors_in_gui: bool,

    /// 选择器单元（`[unit.<name>]`）
    #[serde(default)]
    pub unit: BTreeMap<String, UnitConfig>,

    /// 通道（`[lane.<name>]`）
    #[serde(default)]
    pub lane: BTreeMap<String, LaneConfig>,

    /// 张力辅助控制器（`[tension.<name>]`）
    #[serde(default)]
    pub tension: BTreeMap<String, TensionConfig>,
}

/// 选择器单元配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitConfig {
    /// 共享驱动电机名称
    pub drive_stepper: String,
    /// 选择器电机名称
    pub selector_stepper: String,
    /// 归零开关引脚
    pub home_pin: String,
    /// 公共张力开关引脚
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tension_common_pin: Option<String>,
    #[serde(default = "default_steps_per_lane")]
    pub steps_per_lane: u32,
    #[serde(default = "default_steps_per_position")]
    pub steps_per_position: u32,
    /// 定位速度（mm/s）
    #[serde(default = "default_selector_speed")]
    pub selector_speed: f64,
    /// 定位加速度（mm/s²）
    #[serde(default = "default_selector_accel")]
    pub selector_accel: f64,
    /// 覆盖全局 `enable_sensors_in_gui`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_sensors_in_gui: Option<bool>,
}

impl UnitConfig {
    pub fn geometry(&self) -> SelectorGeometry {
        SelectorGeometry::new(self.steps_per_lane, self.steps_per_position)
    }

    /// 解析后的传感器显示设置
    pub fn show_sensors(&self, global: bool) -> bool {
        self.enable_sensors_in_gui.unwrap_or(global)
    }
}

/// 通道配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaneConfig {
    /// 所属单元
    pub unit: String,
    /// 单元内编号（从 1 开始）
    pub index: u8,
    /// 使用的张力辅助控制器
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tension: Option<String>,
}

/// 张力辅助控制器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TensionConfig {
    /// 张力开关引脚
    pub tension_pin: String,
    #[serde(default)]
    pub assist_mode: AssistMode,
    /// 每次送料长度（mm）
    #[serde(default = "default_feed_length")]
    pub tension_feed_length: f64,
    /// 送料速度（mm/s）
    #[serde(default = "default_feed_speed")]
    pub tension_feed_speed: f64,
    /// 送料加速度（mm/s²）
    #[serde(default = "default_feed_accel")]
    pub tension_feed_accel: f64,
    /// 保留参数
    #[serde(default = "default_hub_retract_distance")]
    pub hub_retract_distance: f64,
    #[serde(default)]
    pub debug: bool,
    /// 覆盖全局 `enable_sensors_in_gui`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_sensors_in_gui: Option<bool>,
}

impl TensionConfig {
    /// 解析后的传感器显示设置
    pub fn show_sensors(&self, global: bool) -> bool {
        self.enable_sensors_in_gui.unwrap_or(global)
    }
}

// ==================== 加载与校验 ====================

impl AceConfig {
    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// 序列化为 TOML 文本
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// 保存到文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 单元的通道（按编号排序）
    pub fn lanes_of<'a>(&'a self, unit: &str) -> Vec<(&'a str, &'a LaneConfig)> {
        let mut lanes: Vec<_> = self
            .lane
            .iter()
            .filter(|(_, lane)| lane.unit == unit)
            .map(|(name, lane)| (name.as_str(), lane))
            .collect();
        lanes.sort_by_key(|(_, lane)| lane.index);
        lanes
    }

    /// 校验交叉引用与取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit.is_empty() {
            return Err(ConfigError::NoUnits);
        }

        for (name, unit) in &self.unit {
            let section = format!("unit.{}", name);
            non_empty(&section, "drive_stepper", &unit.drive_stepper)?;
            non_empty(&section, "selector_stepper", &unit.selector_stepper)?;
            non_empty(&section, "home_pin", &unit.home_pin)?;
            if let Some(pin) = &unit.tension_common_pin {
                non_empty(&section, "tension_common_pin", pin)?;
            }
            if unit.drive_stepper == unit.selector_stepper {
                return Err(invalid(
                    &section,
                    "selector_stepper",
                    "must differ from drive_stepper",
                ));
            }
            for (field, value) in [
                ("steps_per_lane", unit.steps_per_lane),
                ("steps_per_position", unit.steps_per_position),
            ] {
                if value == 0 {
                    return Err(invalid(&section, field, "must be positive"));
                }
                if value > MAX_STEPS {
                    return Err(invalid(
                        &section,
                        field,
                        &format!("must not exceed {}", MAX_STEPS),
                    ));
                }
            }
            positive(&section, "selector_speed", unit.selector_speed)?;
            positive(&section, "selector_accel", unit.selector_accel)?;
        }

        for (name, tension) in &self.tension {
            let section = format!("tension.{}", name);
            non_empty(&section, "tension_pin", &tension.tension_pin)?;
            positive(&section, "tension_feed_length", tension.tension_feed_length)?;
            positive(&section, "tension_feed_speed", tension.tension_feed_speed)?;
            positive(&section, "tension_feed_accel", tension.tension_feed_accel)?;
            if !tension.hub_retract_distance.is_finite() || tension.hub_retract_distance < 0.0 {
                return Err(invalid(
                    &section,
                    "hub_retract_distance",
                    "must be non-negative",
                ));
            }
        }

        for (name, lane) in &self.lane {
            let section = format!("lane.{}", name);
            if !self.unit.contains_key(&lane.unit) {
                return Err(ConfigError::UnknownReference {
                    section,
                    field: "unit",
                    target: format!("unit.{}", lane.unit),
                });
            }
            if let Some(tension) = &lane.tension {
                if !self.tension.contains_key(tension) {
                    return Err(ConfigError::UnknownReference {
                        section,
                        field: "tension",
                        target: format!("tension.{}", tension),
                    });
                }
            }
        }

        for unit in self.unit.keys() {
            for (expected, (name, lane)) in (1u16..).zip(self.lanes_of(unit)) {
                if u16::from(lane.index) != expected {
                    return Err(ConfigError::LaneLayout {
                        unit: unit.clone(),
                        reason: format!(
                            "lane {} has index {}, expected {} (indices must be 1..N without gaps or duplicates)",
                            name, lane.index, expected
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

fn invalid(section: &str, field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        section: section.to_string(),
        field,
        reason: reason.to_string(),
    }
}

fn non_empty(section: &str, field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(section, field, "must not be empty"));
    }
    Ok(())
}

fn positive(section: &str, field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(section, field, "must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
enable_sensors_in_gui = true

[unit.ACE_1]
drive_stepper = "ace_drive"
selector_stepper = "ace_selector"
home_pin = "PA1"
tension_common_pin = "PA6"
steps_per_lane = 120
enable_sensors_in_gui = false

[lane.lane1]
unit = "ACE_1"
index = 1
tension = "ACE_tension1"

[lane.lane2]
unit = "ACE_1"
index = 2

[tension.ACE_tension1]
tension_pin = "PB1"
assist_mode = "Active"
debug = true
"#;

    fn sample() -> AceConfig {
        AceConfig::from_toml_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_sample_with_defaults() {
        let config = sample();
        let unit = &config.unit["ACE_1"];
        assert_eq!(unit.steps_per_lane, 120);
        assert_eq!(unit.steps_per_position, 50);
        assert_eq!(unit.selector_speed, 50.0);
        assert_eq!(unit.selector_accel, 50.0);
        assert_eq!(unit.tension_common_pin.as_deref(), Some("PA6"));
        assert_eq!(unit.geometry(), SelectorGeometry::new(120, 50));

        let tension = &config.tension["ACE_tension1"];
        assert_eq!(tension.assist_mode, AssistMode::Active);
        assert_eq!(tension.tension_feed_length, 10.0);
        assert_eq!(tension.tension_feed_speed, 50.0);
        assert_eq!(tension.tension_feed_accel, 400.0);
        assert_eq!(tension.hub_retract_distance, 20.0);
        assert!(tension.debug);
    }

    #[test]
    fn test_sensor_visibility_inherits_global() {
        let config = sample();
        assert!(!config.unit["ACE_1"].show_sensors(config.enable_sensors_in_gui));
        assert!(config.tension["ACE_tension1"].show_sensors(config.enable_sensors_in_gui));
    }

    #[test]
    fn test_default_mode_is_passive() {
        let config = AceConfig::from_toml_str(
            r#"
[unit.U]
drive_stepper = "d"
selector_stepper = "s"
home_pin = "PA1"

[tension.T]
tension_pin = "PB1"
"#,
        )
        .unwrap();
        assert_eq!(config.tension["T"].assist_mode, AssistMode::Passive);
        assert!(!config.tension["T"].debug);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let err = AceConfig::from_toml_str(&SAMPLE.replace("\"Active\"", "\"boost\"")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("boost"));
    }

    #[test]
    fn test_missing_home_pin_rejected() {
        let err = AceConfig::from_toml_str(
            r#"
[unit.U]
drive_stepper = "d"
selector_stepper = "s"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = AceConfig::from_toml_str(&SAMPLE.replace("debug = true", "debgu = true"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_config_rejected() {
        assert!(matches!(
            AceConfig::from_toml_str(""),
            Err(ConfigError::NoUnits)
        ));
    }

    #[test]
    fn test_lane_gap_rejected() {
        let err = AceConfig::from_toml_str(&SAMPLE.replace("index = 2", "index = 3")).unwrap_err();
        assert!(matches!(err, ConfigError::LaneLayout { ref unit, .. } if unit == "ACE_1"));
    }

    #[test]
    fn test_duplicate_lane_index_rejected() {
        let err = AceConfig::from_toml_str(&SAMPLE.replace("index = 2", "index = 1")).unwrap_err();
        assert!(matches!(err, ConfigError::LaneLayout { .. }));
    }

    #[test]
    fn test_unknown_references_rejected() {
        let err = AceConfig::from_toml_str(&SAMPLE.replace(
            "tension = \"ACE_tension1\"",
            "tension = \"ACE_tension9\"",
        ))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[lane.lane1] tension refers to unknown section [tension.ACE_tension9]"
        );

        let err = AceConfig::from_toml_str(&SAMPLE.replace(
            "[lane.lane2]\nunit = \"ACE_1\"",
            "[lane.lane2]\nunit = \"ACE_2\"",
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownReference { field: "unit", .. }));
    }

    #[test]
    fn test_value_ranges_checked() {
        let err = AceConfig::from_toml_str(&SAMPLE.replace("steps_per_lane = 120", "steps_per_lane = 0"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for steps_per_lane in [unit.ACE_1]: must be positive"
        );

        let err = AceConfig::from_toml_str(
            &SAMPLE.replace("steps_per_lane = 120", "steps_per_lane = 1500000000"),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for steps_per_lane in [unit.ACE_1]: must not exceed 1000000"
        );

        let err = AceConfig::from_toml_str(&SAMPLE.replace(
            "steps_per_lane = 120",
            "steps_per_lane = 120\nsteps_per_position = 4000000000",
        ))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "steps_per_position", .. }));

        let err = AceConfig::from_toml_str(&SAMPLE.replace("debug = true", "tension_feed_speed = -1.0"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "tension_feed_speed", .. }));

        let err = AceConfig::from_toml_str(&SAMPLE.replace("\"ace_selector\"", "\"ace_drive\""))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "selector_stepper", .. }));
    }

    #[test]
    fn test_lanes_of_sorted() {
        let config = sample();
        let names: Vec<_> = config.lanes_of("ACE_1").iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["lane1", "lane2"]);
        assert!(config.lanes_of("ACE_2").is_empty());
    }

    #[test]
    fn test_load_and_save_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ace.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = AceConfig::load(&path).unwrap();
        assert_eq!(config, sample());

        let copy = dir.path().join("copy.toml");
        config.save(&copy).unwrap();
        assert_eq!(AceConfig::load(&copy).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AceConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
