//! 通道逻辑状态定义

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// 通道逻辑状态
///
/// 由外部的通道生命周期管理修改，选择器状态机只读取
/// （例如断料判定需要排除 `Ejecting` / `Calibrating`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum LaneState {
    /// 空闲（无耗材或未知）
    #[default]
    Idle = 0,
    /// 正在装载到通道
    Loading = 1,
    /// 已装载到通道
    Loaded = 2,
    /// 正在送入打印头
    ToolLoading = 3,
    /// 已送入打印头
    ToolLoaded = 4,
    /// 正在从打印头退出
    ToolUnloading = 5,
    /// 正在退出通道
    Unloading = 6,
    /// 正在弹出耗材
    Ejecting = 7,
    /// 正在标定
    Calibrating = 8,
    /// 错误
    Error = 9,
}

impl LaneState {
    /// 从 u8 转换
    ///
    /// 如果值无效，返回 Idle。
    pub fn from_u8(value: u8) -> Self {
        Self::try_from(value).unwrap_or_default()
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self.into()
    }

    /// 该状态是否屏蔽断料判定
    pub fn suppresses_runout(self) -> bool {
        matches!(self, Self::Ejecting | Self::Calibrating)
    }

    /// 状态名称
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::ToolLoading => "tool_loading",
            Self::ToolLoaded => "tool_loaded",
            Self::ToolUnloading => "tool_unloading",
            Self::Unloading => "unloading",
            Self::Ejecting => "ejecting",
            Self::Calibrating => "calibrating",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LaneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
