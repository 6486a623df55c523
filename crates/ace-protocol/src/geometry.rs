//! 选择器几何模型
//!
//! 通道 `i`（从 1 开始）位于距归零参考点 `(i-1) * steps_per_lane` 处；
//! 通道内的位置偏移为 FREE = 0、LOAD = +steps_per_position、UNLOAD = -steps_per_position。
//!
//! 所有位移都相对于归零参考点计算，而不是相对于执行器的上一个位置。

use crate::ProtocolError;
use crate::position::SelectorPosition;

/// 单个间距参数的上限（步）
///
/// 255 个通道加上位置偏移仍在 `i32` 范围内，归零预算也不会超出 `u32`。
pub const MAX_STEPS: u32 = 1_000_000;

/// 选择器几何参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectorGeometry {
    /// 相邻通道间距（步）
    pub steps_per_lane: u32,
    /// 通道内位置间距（步）
    pub steps_per_position: u32,
}

impl Default for SelectorGeometry {
    fn default() -> Self {
        Self {
            steps_per_lane: 100,
            steps_per_position: 50,
        }
    }
}

impl SelectorGeometry {
    /// 创建几何参数
    pub const fn new(steps_per_lane: u32, steps_per_position: u32) -> Self {
        Self {
            steps_per_lane,
            steps_per_position,
        }
    }

    /// 检查间距参数范围（`1..=MAX_STEPS`）
    pub fn validate(&self) -> Result<(), ProtocolError> {
        for (field, value) in [
            ("steps_per_lane", self.steps_per_lane),
            ("steps_per_position", self.steps_per_position),
        ] {
            if value == 0 || value > MAX_STEPS {
                return Err(ProtocolError::StepsOutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// 通道相对归零参考点的偏移
    pub fn lane_offset(&self, lane_index: u8) -> i32 {
        (i32::from(lane_index) - 1).saturating_mul(steps(self.steps_per_lane))
    }

    /// 通道内位置的偏移
    pub fn position_offset(&self, position: SelectorPosition) -> i32 {
        position
            .direction()
            .saturating_mul(steps(self.steps_per_position))
    }

    /// 目标位移（相对归零参考点）
    ///
    /// `displacement(i, p) == (i-1) * steps_per_lane + offset(p)`
    ///
    /// 超出 [`validate`](Self::validate) 范围的参数按饱和运算处理，不会回绕。
    pub fn displacement(&self, lane_index: u8, position: SelectorPosition) -> i32 {
        self.lane_offset(lane_index)
            .saturating_add(self.position_offset(position))
    }

    /// 归零蠕动步数上限
    ///
    /// 覆盖整个通道跨度加上位置跨度，并留有余量：
    /// `4 * steps_per_lane + 2 * steps_per_position`
    pub fn homing_budget(&self) -> u32 {
        self.steps_per_lane
            .saturating_mul(4)
            .saturating_add(self.steps_per_position.saturating_mul(2))
    }
}

fn steps(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_geometry() {
        let geometry = SelectorGeometry::default();
        assert_eq!(geometry.steps_per_lane, 100);
        assert_eq!(geometry.steps_per_position, 50);
        assert_eq!(geometry.homing_budget(), 500);
    }

    #[test]
    fn test_displacement_examples() {
        let geometry = SelectorGeometry::new(100, 50);

        assert_eq!(geometry.displacement(1, SelectorPosition::Free), 0);
        assert_eq!(geometry.displacement(1, SelectorPosition::Unload), -50);
        assert_eq!(geometry.displacement(2, SelectorPosition::Unload), 50);
        assert_eq!(geometry.displacement(2, SelectorPosition::Free), 100);
        assert_eq!(geometry.displacement(3, SelectorPosition::Load), 250);
        assert_eq!(geometry.displacement(4, SelectorPosition::Load), 350);
    }

    #[test]
    fn test_validate_range() {
        assert!(SelectorGeometry::default().validate().is_ok());
        assert!(SelectorGeometry::new(MAX_STEPS, MAX_STEPS).validate().is_ok());
        assert_eq!(
            SelectorGeometry::new(0, 50).validate(),
            Err(ProtocolError::StepsOutOfRange {
                field: "steps_per_lane",
                value: 0
            })
        );
        assert_eq!(
            SelectorGeometry::new(100, MAX_STEPS + 1).validate(),
            Err(ProtocolError::StepsOutOfRange {
                field: "steps_per_position",
                value: MAX_STEPS + 1
            })
        );
    }

    #[test]
    fn test_oversized_geometry_saturates() {
        let geometry = SelectorGeometry::new(3_000_000_000, 50);
        assert_eq!(geometry.displacement(2, SelectorPosition::Free), i32::MAX);
        assert_eq!(geometry.displacement(1, SelectorPosition::Unload), -50);
        assert_eq!(SelectorGeometry::new(1_500_000_000, 50).homing_budget(), u32::MAX);
    }

    #[test]
    fn test_largest_valid_geometry_fits() {
        let geometry = SelectorGeometry::new(MAX_STEPS, MAX_STEPS);
        assert_eq!(geometry.homing_budget(), 6 * MAX_STEPS);
        let far = geometry.displacement(u8::MAX, SelectorPosition::Load);
        assert_eq!(i64::from(far), 254 * i64::from(MAX_STEPS) + i64::from(MAX_STEPS));
    }

    proptest! {
        /// 位移 = 通道偏移 + 位置偏移
        #[test]
        fn displacement_matches_model(
            spl in 1u32..1000,
            spp in 0u32..500,
            lane in 1u8..=16,
            pos in 0u8..=2,
        ) {
            let geometry = SelectorGeometry::new(spl, spp);
            let position = SelectorPosition::from_u8(pos).unwrap();
            let expected = (i32::from(lane) - 1) * spl as i32 + match position {
                SelectorPosition::Free => 0,
                SelectorPosition::Load => spp as i32,
                SelectorPosition::Unload => -(spp as i32),
            };
            prop_assert_eq!(geometry.displacement(lane, position), expected);
        }

        /// 同一通道内 LOAD 与 UNLOAD 关于 FREE 对称
        #[test]
        fn load_unload_symmetric(spl in 1u32..1000, spp in 0u32..500, lane in 1u8..=16) {
            let geometry = SelectorGeometry::new(spl, spp);
            let free = geometry.displacement(lane, SelectorPosition::Free);
            let load = geometry.displacement(lane, SelectorPosition::Load);
            let unload = geometry.displacement(lane, SelectorPosition::Unload);
            prop_assert_eq!(load - free, free - unload);
        }
    }
}
