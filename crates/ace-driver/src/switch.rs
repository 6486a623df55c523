//! 开关量传感器电平
//!
//! 保存开关的最近一次电平（无历史缓冲），用于归零开关和张力开关。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 开关电平（共享句柄）
///
/// # 使用场景
///
/// - 传感器边沿回调写入最新电平
/// - 归零循环在每次蠕动移动前读取电平
///
/// 克隆得到的句柄指向同一个电平，适合在 IO 侧与状态机之间共享。
///
/// # 示例
///
/// ```rust
/// use ace_driver::SwitchLevel;
///
/// let home = SwitchLevel::new(false);
/// let io_side = home.clone();
///
/// io_side.set(true);
/// assert!(home.get());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SwitchLevel {
    inner: Arc<AtomicBool>,
}

impl SwitchLevel {
    /// 创建指定初始电平的开关
    pub fn new(level: bool) -> Self {
        Self {
            inner: Arc::new(AtomicBool::new(level)),
        }
    }

    /// 读取最近电平
    pub fn get(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// 写入最新电平，返回之前的电平
    pub fn set(&self, level: bool) -> bool {
        self.inner.swap(level, Ordering::AcqRel)
    }
}
