//! 客户端接口模块
//!
//! 本模块提供 ACE 选择器单元的核心逻辑，包括：
//! - 选择器定位/归零状态机（[`AceUnit`]）
//! - 张力触发的送料辅助控制器（[`control::TensionAssist`]）
//! - 传感器事件分发（[`reactor::Reactor`]）
//! - 命令接口（`HOME_UNIT`、`ACE_SET_POSITION`、`*_TENSION_*`）
//! - 只读状态快照
//!
//! # 线程模型
//!
//! 所有操作都在宿主的单线程事件循环中执行。组件通过 `Arc` 共享，
//! 内部的锁只用于满足 `Send + Sync`，不会跨组件调用持有。

pub mod commands;
pub mod control;
mod error;
pub mod lane;
pub mod reactor;
pub mod selector;
pub mod status;

// 重新导出常用类型
pub use commands::{CommandDispatcher, CommandResponse, GcodeCommand};
pub use control::{TensionAssist, TensionSettings};
pub use error::{BuildError, CommandError, SelectorError};
pub use lane::Lane;
pub use reactor::{Reactor, SensorRouter, SensorTarget};
pub use selector::{
    ActuatorMap, AceUnit, ExplicitMove, SelectorState, SelectorUnit, UnitBuilder, UnitSettings,
};
pub use status::{LaneStatus, TensionStatus, UnitStatus};
