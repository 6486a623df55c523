//! # ACE Protocol
//!
//! ACE 选择器单元的值类型定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `position`: 选择器位置（FREE / LOAD / UNLOAD）
//! - `mode`: 张力辅助模式（Active / Passive）
//! - `lane`: 通道逻辑状态
//! - `geometry`: 选择器几何模型（通道/位置 → 物理位移）
//!
//! ## 坐标约定
//!
//! 所有位移均以归零参考点（home reference）为原点，单位为步（step）。
//! 通道编号从 1 开始。

pub mod geometry;
pub mod lane;
pub mod mode;
pub mod position;

// 重新导出常用类型
pub use geometry::SelectorGeometry;
pub use lane::LaneState;
pub use mode::AssistMode;
pub use position::SelectorPosition;

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 无效的枚举数值（如 POSITION=3）
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: u8 },

    /// 无效的张力辅助模式字符串
    #[error("Invalid mode '{0}'. Must be 'active' or 'passive'")]
    InvalidMode(String),

    /// 无效的通道编号（通道从 1 开始）
    #[error("Invalid lane index: {0} (lanes are numbered from 1)")]
    InvalidLaneIndex(u8),

    /// 选择器间距参数超出范围
    #[error("Invalid value for {field}: {value} (must be between 1 and {max})", max = geometry::MAX_STEPS)]
    StepsOutOfRange { field: &'static str, value: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::InvalidValue {
            field: "SelectorPosition",
            value: 7,
        };
        assert_eq!(err.to_string(), "Invalid value for SelectorPosition: 7");

        let err = ProtocolError::InvalidMode("turbo".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid mode 'turbo'. Must be 'active' or 'passive'"
        );

        let err = ProtocolError::InvalidLaneIndex(0);
        assert!(err.to_string().contains("lanes are numbered from 1"));

        let err = ProtocolError::StepsOutOfRange {
            field: "steps_per_lane",
            value: 2_000_000,
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for steps_per_lane: 2000000 (must be between 1 and 1000000)"
        );
    }
}
