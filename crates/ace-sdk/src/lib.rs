//! ACE SDK - ACE 耗材选择器单元 Rust SDK
//!
//! 管理多通道耗材选择器：一个共享驱动电机负责送料/退料，
//! 一个选择器电机把若干通道之一压到驱动轮上（FREE / LOAD / UNLOAD 三个位置），
//! 归零开关提供绝对参考，张力开关触发打印中的送料辅助。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 位置/模式/通道状态值类型与选择器几何
//! - **驱动层** (`driver`): 执行器、开关、事件总线与宿主服务接口
//! - **客户端层** (`client`): 选择器状态机、张力辅助控制器、命令接口
//! - **配置层** (`tools`): TOML 配置模型与校验
//!
//! # 快速开始
//!
//! ```rust
//! use ace_sdk::prelude::*;
//! ```
//!
//! 从配置文件装配完整系统见 [`AceSystem::from_config`]。

pub mod logging;
pub mod prelude;
#[cfg(feature = "mock")]
pub mod simulation;
mod system;

// 分层重新导出
pub use ace_client as client;
pub use ace_driver as driver;
pub use ace_protocol as protocol;
pub use ace_tools as tools;

// --- 用户以此为界 ---
// 以下是通过 Facade Pattern 提供的公共 API

pub use ace_client::{
    AceUnit, BuildError, CommandDispatcher, CommandError, CommandResponse, Lane, SelectorError,
    TensionAssist, TensionStatus, UnitStatus,
};
pub use ace_driver::DriverError;
pub use ace_protocol::ProtocolError;
pub use ace_tools::{AceConfig, ConfigError};
pub use logging::{LoggingError, init_logging, init_logging_with};
pub use system::{AceSystem, Hardware, SystemError, SystemStatus};
