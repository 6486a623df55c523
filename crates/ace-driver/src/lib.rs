//! 驱动层模块
//!
//! 本模块提供 ACE 选择器单元的硬件抽象，包括：
//! - 执行器接口（相对移动、使能/失能）
//! - 开关量传感器电平（归零开关、张力开关）
//! - 传感器边沿事件总线（单线程顺序分发）
//! - 宿主服务接口（打印状态查询、错误上报、指示灯）
//!
//! # 使用场景
//!
//! 状态机与控制器只依赖这里定义的 trait，真实硬件与模拟硬件都通过实现这些 trait 接入。
//! 启用 `mock` feature 可获得用于测试与演示的模拟实现。

pub mod actuator;
pub mod error;
pub mod events;
pub mod host;
pub mod lane_state;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod switch;

pub use actuator::{Actuator, MoveCommand};
pub use error::DriverError;
pub use events::{EventBus, EventSender, SensorEvent};
pub use host::{ErrorReporter, Indicator, LogReporter, PrintMonitor};
pub use lane_state::AtomicLaneState;
pub use switch::SwitchLevel;
