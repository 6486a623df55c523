//! 选择器位置定义
//!
//! 每个通道有三个位置：
//! - FREE（空挡）：耗材可自由移动
//! - LOAD（进料）：耗材与驱动齿轮啮合，用于向打印机送料
//! - UNLOAD（退料）：耗材与驱动齿轮啮合，用于退回料盘

use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// 选择器位置
///
/// 数值与命令接口中的 `POSITION=<0..2>` 参数一一对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum SelectorPosition {
    /// 空挡位置（偏移 0）
    Free = 0,
    /// 进料位置（偏移 +steps_per_position）
    Load = 1,
    /// 退料位置（偏移 -steps_per_position）
    Unload = 2,
}

impl SelectorPosition {
    /// 所有位置（按数值顺序）
    pub const ALL: [SelectorPosition; 3] = [Self::Free, Self::Load, Self::Unload];

    /// 从命令参数数值解析
    ///
    /// 超出 0..=2 的数值返回 `ProtocolError::InvalidValue`。
    pub fn from_u8(value: u8) -> Result<Self, ProtocolError> {
        Self::try_from(value).map_err(|e| ProtocolError::InvalidValue {
            field: "SelectorPosition",
            value: e.number,
        })
    }

    /// 转换为命令参数数值
    pub fn as_u8(self) -> u8 {
        self.into()
    }

    /// 通道内的偏移方向
    ///
    /// FREE = 0, LOAD = +1, UNLOAD = -1（乘以 `steps_per_position` 得到偏移量）
    pub fn direction(self) -> i32 {
        match self {
            Self::Free => 0,
            Self::Load => 1,
            Self::Unload => -1,
        }
    }

    /// 位置名称（大写，用于日志）
    pub fn name(self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Load => "LOAD",
            Self::Unload => "UNLOAD",
        }
    }
}

impl fmt::Display for SelectorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
