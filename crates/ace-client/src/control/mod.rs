//! 控制器模块
//!
//! 提供张力触发的送料辅助控制器：
//! - `TensionAssist` - 监听张力开关边沿，在主动模式下驱动共享驱动电机送料
//! - `TensionSettings` - 控制器运行参数

pub mod tension_assist;

// 重新导出常用类型
pub use tension_assist::{TensionAssist, TensionSettings};
