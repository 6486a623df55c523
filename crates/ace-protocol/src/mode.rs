//! 张力辅助模式定义

use crate::ProtocolError;
use crate::position::SelectorPosition;
use std::fmt;
use std::str::FromStr;

/// 张力辅助模式
///
/// # 模式说明
///
/// - **Active**: 选择器保持在 LOAD 位置，检测到张力时驱动电机送料
/// - **Passive**: 选择器保持在 FREE 位置，耗材自由移动，只记录传感器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AssistMode {
    /// 主动模式
    Active,
    /// 被动模式（默认）
    #[default]
    Passive,
}

impl AssistMode {
    /// 该模式下选择器应保持的位置
    pub fn selector_position(self) -> SelectorPosition {
        match self {
            Self::Active => SelectorPosition::Load,
            Self::Passive => SelectorPosition::Free,
        }
    }

    /// 是否为主动模式
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    /// 模式名称（小写，与配置/命令参数一致）
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Passive => "passive",
        }
    }

    /// 首字母大写的名称（用于状态文本）
    pub fn title(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Passive => "Passive",
        }
    }
}

impl FromStr for AssistMode {
    type Err = ProtocolError;

    /// 解析模式字符串（忽略大小写和首尾空白）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "passive" => Ok(Self::Passive),
            other => Err(ProtocolError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for AssistMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 配置文件中的模式字符串与命令参数使用同一套解析规则（忽略大小写）
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AssistMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
