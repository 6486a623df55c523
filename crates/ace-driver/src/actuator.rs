//! 执行器接口定义
//!
//! 对物理直线/旋转执行器（步进电机）的抽象：相对移动 + 使能控制。
//! 选择器电机与共享驱动电机都通过此接口驱动。

use crate::error::DriverError;

/// 相对移动命令
///
/// 位移单位与执行器配置一致（选择器使用步，驱动电机使用 mm）。
/// `wait = true` 表示调用方阻塞直到移动完成。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCommand {
    /// 相对位移（正值远离归零点/向打印机送料）
    pub distance: f64,
    /// 速度（单位/s）
    pub speed: f64,
    /// 加速度（单位/s²）
    pub accel: f64,
    /// 是否等待移动完成
    pub wait: bool,
}

impl MoveCommand {
    /// 创建非阻塞移动命令
    #[inline]
    pub fn new(distance: f64, speed: f64, accel: f64) -> Self {
        Self {
            distance,
            speed,
            accel,
            wait: false,
        }
    }

    /// 设置为阻塞移动（等待完成）
    #[inline]
    pub fn blocking(mut self) -> Self {
        self.wait = true;
        self
    }

    /// 校验命令参数
    ///
    /// 位移必须是有限值，速度和加速度必须为正。
    pub fn validate(&self, actuator: &str) -> Result<(), DriverError> {
        let reason = if !self.distance.is_finite() {
            "distance must be finite"
        } else if !(self.speed > 0.0) {
            "speed must be positive"
        } else if !(self.accel > 0.0) {
            "acceleration must be positive"
        } else {
            return Ok(());
        };

        Err(DriverError::InvalidMove {
            name: actuator.to_string(),
            reason: reason.to_string(),
        })
    }
}

/// 执行器 Trait
///
/// # 线程模型
///
/// 执行器在多个组件之间通过 `Arc<dyn Actuator>` 共享（例如共享驱动电机被多个
/// 张力辅助控制器使用），因此方法都接收 `&self`，由实现负责内部可变性。
/// 调用本身发生在宿主的单线程事件循环中，不会并发。
pub trait Actuator: Send + Sync {
    /// 执行器名称（对应配置中的 stepper 名称）
    fn name(&self) -> &str;

    /// 执行相对移动
    ///
    /// `command.wait` 为 true 时必须在移动完成后返回。
    fn move_by(&self, command: MoveCommand) -> Result<(), DriverError>;

    /// 使能/失能电机
    ///
    /// 失能后电机不再保持力矩。
    fn set_enabled(&self, enabled: bool) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_command_builder() {
        let cmd = MoveCommand::new(10.0, 50.0, 400.0);
        assert!(!cmd.wait);

        let cmd = cmd.blocking();
        assert!(cmd.wait);
        assert_eq!(cmd.distance, 10.0);
        assert_eq!(cmd.speed, 50.0);
        assert_eq!(cmd.accel, 400.0);
    }

    #[test]
    fn test_move_command_validate() {
        assert!(MoveCommand::new(-1.0, 20.0, 20.0).validate("sel").is_ok());
        assert!(MoveCommand::new(0.0, 20.0, 20.0).validate("sel").is_ok());

        let err = MoveCommand::new(1.0, 0.0, 20.0).validate("sel").unwrap_err();
        assert!(err.to_string().contains("speed must be positive"));

        let err = MoveCommand::new(1.0, 20.0, -5.0).validate("sel").unwrap_err();
        assert!(err.to_string().contains("acceleration must be positive"));

        let err = MoveCommand::new(f64::NAN, 20.0, 20.0).validate("sel").unwrap_err();
        assert!(err.to_string().contains("distance must be finite"));

        // NaN 速度同样被拒绝
        assert!(MoveCommand::new(1.0, f64::NAN, 20.0).validate("sel").is_err());
    }
}
