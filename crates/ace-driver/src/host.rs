//! 宿主服务接口
//!
//! 选择器单元与张力辅助控制器运行在宿主（打印机固件主机进程）之内，
//! 通过以下 trait 查询打印状态、上报错误、控制通道指示灯。
//! 所有实现都在宿主的单线程事件循环中被调用。

use crate::error::DriverError;

/// 打印状态查询
///
/// 对应宿主的打印任务状态机，本 crate 只读取。
pub trait PrintMonitor: Send + Sync {
    /// 宿主是否处于就绪状态（"Printer is ready"）
    fn is_ready(&self) -> bool;

    /// 是否正在打印
    fn is_printing(&self) -> bool;

    /// 打印是否已暂停
    fn is_paused(&self) -> bool;

    /// 是否正在换料（toolchange）
    fn in_toolchange(&self) -> bool;

    /// 当前送入打印头的通道名称
    fn current_lane(&self) -> Option<String>;
}

/// 错误上报
///
/// 用于上报需要用户关注但不终止进程的运行期错误（例如归零失败）。
pub trait ErrorReporter: Send + Sync {
    /// 上报错误
    ///
    /// `pause` 为 true 时宿主可以选择暂停打印。
    fn report(&self, message: &str, pause: bool);
}

/// 通道指示灯
///
/// 每个通道一个独立的白色 LED（非 Neopixel）。
pub trait Indicator: Send + Sync {
    /// 设置通道指示灯亮度
    ///
    /// - `lane_index`: 通道编号（从 1 开始）
    /// - `brightness`: 0.0（熄灭）到 1.0（全亮）
    fn set_white(&self, lane_index: u8, brightness: f32) -> Result<(), DriverError>;
}

/// 不执行任何操作的错误上报器（仅写日志）
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, message: &str, pause: bool) {
        tracing::error!(pause, "{}", message);
    }
}
