//! 只读状态快照
//!
//! 供外部遥测轮询使用；生成快照不会修改任何状态。

use ace_protocol::{AssistMode, LaneState, SelectorPosition};

/// 通道状态
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LaneStatus {
    pub name: String,
    pub index: u8,
    pub state: LaneState,
}

/// 选择器单元状态
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnitStatus {
    pub name: String,
    /// 自上次成功归零以来是否保持已知参考
    pub homed: bool,
    /// 粘滞的归零失败标志
    pub home_failed: bool,
    /// 归零开关电平
    pub home_switch: bool,
    /// 公共张力开关电平（未配置时为 `None`）
    pub common_tension: Option<bool>,
    pub selected_lane: Option<String>,
    pub selected_position: Option<SelectorPosition>,
    pub lanes: Vec<LaneStatus>,
    /// 是否在界面中显示传感器
    pub show_sensors: bool,
}

/// 张力辅助控制器状态
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TensionStatus {
    pub name: String,
    pub enabled: bool,
    pub mode: AssistMode,
    /// 张力开关电平（true = 检测到张力）
    pub tension_state: bool,
    /// 曾经绑定过的通道名称
    pub lanes: Vec<String>,
    pub current_lane: Option<String>,
    pub buffer_status: String,
    pub feed_length: f64,
    pub feed_speed: f64,
    pub show_sensors: bool,
}
