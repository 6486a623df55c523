//! 通道状态（原子版本）
//!
//! 通道状态同时被选择器单元、张力辅助控制器和外部通道生命周期逻辑访问，
//! 使用原子操作保存，避免为单个字段引入锁。

use ace_protocol::LaneState;
use std::sync::atomic::{AtomicU8, Ordering};

/// 通道状态（原子版本，用于组件间共享）
///
/// # 示例
///
/// ```rust
/// use ace_driver::AtomicLaneState;
/// use ace_protocol::LaneState;
///
/// let state = AtomicLaneState::new(LaneState::Idle);
/// state.set(LaneState::Loaded);
/// assert_eq!(state.get(), LaneState::Loaded);
/// ```
#[derive(Debug)]
pub struct AtomicLaneState {
    inner: AtomicU8,
}

impl AtomicLaneState {
    /// 创建新的原子状态
    pub fn new(state: LaneState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    /// 获取当前状态
    pub fn get(&self) -> LaneState {
        LaneState::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// 设置状态，返回之前的状态
    pub fn set(&self, state: LaneState) -> LaneState {
        LaneState::from_u8(self.inner.swap(state.as_u8(), Ordering::AcqRel))
    }

    /// 比较并交换（Compare-and-Swap）
    ///
    /// 如果当前值等于 `current`，则设置为 `new` 并返回 true，否则返回 false
    pub fn compare_exchange(&self, current: LaneState, new: LaneState) -> bool {
        self.inner
            .compare_exchange(
                current.as_u8(),
                new.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for AtomicLaneState {
    fn default() -> Self {
        Self::new(LaneState::Idle)
    }
}

impl Clone for AtomicLaneState {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_lane_state() {
        let state = AtomicLaneState::default();
        assert_eq!(state.get(), LaneState::Idle);

        assert_eq!(state.set(LaneState::Loading), LaneState::Idle);
        assert_eq!(state.get(), LaneState::Loading);

        assert!(state.compare_exchange(LaneState::Loading, LaneState::Loaded));
        assert_eq!(state.get(), LaneState::Loaded);

        // 失败情况
        assert!(!state.compare_exchange(LaneState::Loading, LaneState::Ejecting));
        assert_eq!(state.get(), LaneState::Loaded);
    }

    #[test]
    fn test_clone_is_independent() {
        let state = AtomicLaneState::new(LaneState::Loaded);
        let copy = state.clone();
        state.set(LaneState::Error);
        assert_eq!(copy.get(), LaneState::Loaded);
    }
}
