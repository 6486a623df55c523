//! # ACE Tools - 配置模型
//!
//! **依赖原则**: 只依赖 `ace-protocol`，避免依赖 `ace-client`
//!
//! ## 包含模块
//!
//! - `config` - TOML 配置文件模型与校验（纯数据结构）
//!
//! ## 使用示例
//!
//! ```rust
//! use ace_tools::AceConfig;
//!
//! let config = AceConfig::from_toml_str(r#"
//! [unit.ACE_1]
//! drive_stepper = "ace_drive"
//! selector_stepper = "ace_selector"
//! home_pin = "PA1"
//!
//! [lane.lane1]
//! unit = "ACE_1"
//! index = 1
//! "#).unwrap();
//! assert_eq!(config.unit["ACE_1"].steps_per_lane, 100);
//! ```

pub mod config;

pub use config::{AceConfig, ConfigError, LaneConfig, TensionConfig, UnitConfig};
