//! 选择器单元
//!
//! 一个 ACE 单元包含一个选择器机构（将若干耗材通道之一压到共享驱动轮上）
//! 和一个共享驱动电机。本模块提供：
//! - [`SelectorUnit`]：通道与张力控制器使用的单元能力接口
//! - [`AceUnit`]：选择器定位/归零状态机
//! - [`UnitBuilder`]：装配单元并解析执行器引用

mod builder;
mod machine;

pub use builder::{ActuatorMap, UnitBuilder};
pub use machine::{AceUnit, ExplicitMove, SelectorState, UnitSettings};

use crate::error::SelectorError;
use crate::lane::Lane;
use ace_driver::Actuator;
use ace_protocol::SelectorPosition;
use std::sync::Arc;

/// 单元能力接口
///
/// 通道通过弱引用持有该接口，张力控制器通过它定位选择器、取得驱动电机。
pub trait SelectorUnit: Send + Sync {
    /// 单元名称
    fn name(&self) -> &str;

    /// 将选择器移动到 `lane` 的 `position`
    fn set_selector_position(
        &self,
        lane: &Arc<Lane>,
        position: SelectorPosition,
    ) -> Result<(), SelectorError>;

    /// 共享驱动电机
    fn drive_actuator(&self) -> Option<Arc<dyn Actuator>>;
}
