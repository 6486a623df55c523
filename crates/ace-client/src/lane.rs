//! 耗材通道
//!
//! 通道由所属单元创建并持有，同时通过弱引用指回单元，
//! 张力控制器只需拿到通道即可找到对应的选择器与驱动电机。

use crate::selector::SelectorUnit;
use ace_driver::AtomicLaneState;
use ace_protocol::{LaneState, ProtocolError};
use std::sync::{Arc, Weak};

/// 耗材通道
#[derive(Debug)]
pub struct Lane {
    name: String,
    index: u8,
    state: AtomicLaneState,
    unit: Weak<dyn SelectorUnit>,
}

impl Lane {
    /// 创建通道
    ///
    /// `index` 从 1 开始编号，0 返回 `ProtocolError::InvalidLaneIndex`。
    pub fn new(
        name: impl Into<String>,
        index: u8,
        unit: Weak<dyn SelectorUnit>,
    ) -> Result<Self, ProtocolError> {
        if index == 0 {
            return Err(ProtocolError::InvalidLaneIndex(index));
        }
        Ok(Self::attached(name.into(), index, unit))
    }

    /// 由单元构建器使用（编号已校验）
    pub(crate) fn attached(name: String, index: u8, unit: Weak<dyn SelectorUnit>) -> Self {
        Self {
            name,
            index,
            state: AtomicLaneState::default(),
            unit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 通道在单元内的编号（从 1 开始）
    pub fn index(&self) -> u8 {
        self.index
    }

    /// 当前装载状态
    pub fn state(&self) -> LaneState {
        self.state.get()
    }

    /// 设置装载状态，返回旧状态
    pub fn set_state(&self, state: LaneState) -> LaneState {
        self.state.set(state)
    }

    /// 所属单元
    ///
    /// 单元已销毁时返回 `None`。
    pub fn unit(&self) -> Option<Arc<dyn SelectorUnit>> {
        self.unit.upgrade()
    }

    /// 所属单元名称
    pub fn unit_name(&self) -> Option<String> {
        self.unit().map(|unit| unit.name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::AceUnit;

    fn detached() -> Weak<dyn SelectorUnit> {
        Weak::<AceUnit>::new()
    }

    #[test]
    fn test_lane_index_starts_at_one() {
        assert_eq!(
            Lane::new("lane0", 0, detached()).unwrap_err(),
            ProtocolError::InvalidLaneIndex(0)
        );
        let lane = Lane::new("lane1", 1, detached()).unwrap();
        assert_eq!(lane.index(), 1);
        assert_eq!(lane.name(), "lane1");
    }

    #[test]
    fn test_detached_lane_has_no_unit() {
        let lane = Lane::new("lane2", 2, detached()).unwrap();
        assert!(lane.unit().is_none());
        assert!(lane.unit_name().is_none());
    }

    #[test]
    fn test_lane_state_transitions() {
        let lane = Lane::new("lane3", 3, detached()).unwrap();
        assert_eq!(lane.state(), LaneState::Idle);
        assert_eq!(lane.set_state(LaneState::Loaded), LaneState::Idle);
        assert_eq!(lane.state(), LaneState::Loaded);
    }
}
