//! Prelude - 常用类型的便捷导入
//!
//! 大多数用户应该使用这个模块来导入常用类型：
//!
//! ```rust
//! use ace_sdk::prelude::*;
//! ```

// 系统装配（推荐入口）
pub use crate::system::{AceSystem, Hardware, SystemStatus};

// 客户端层
pub use ace_client::control::{TensionAssist, TensionSettings};
pub use ace_client::{
    AceUnit, ActuatorMap, CommandDispatcher, Lane, SelectorUnit, UnitBuilder, UnitSettings,
};

// 值类型
pub use ace_protocol::{AssistMode, LaneState, SelectorGeometry, SelectorPosition};

// 驱动层（常用 Trait）
pub use ace_driver::{Actuator, ErrorReporter, Indicator, MoveCommand, PrintMonitor, SwitchLevel};

// 错误类型
pub use crate::system::SystemError;
pub use ace_client::{BuildError, CommandError, SelectorError};
pub use ace_driver::DriverError;
pub use ace_protocol::ProtocolError;
pub use ace_tools::ConfigError;
