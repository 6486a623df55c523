//! 驱动层错误类型定义

use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// 执行器故障（移动被拒绝、驱动器报错等）
    #[error("Actuator '{name}' fault: {reason}")]
    ActuatorFault { name: String, reason: String },

    /// 执行器参数无效（速度/加速度非正、位移非有限值）
    #[error("Invalid move for actuator '{name}': {reason}")]
    InvalidMove { name: String, reason: String },

    /// 指示灯不存在
    #[error("Indicator for lane {0} not found")]
    IndicatorNotFound(u8),

    /// 事件通道已关闭
    #[error("Sensor event channel closed")]
    ChannelClosed,
}

#[cfg(test)]
mod tests {
    use super::DriverError;

    /// 测试 DriverError 的 Display 实现
    #[test]
    fn test_driver_error_display() {
        let err = DriverError::ActuatorFault {
            name: "ace_drive".to_string(),
            reason: "stalled".to_string(),
        };
        assert_eq!(err.to_string(), "Actuator 'ace_drive' fault: stalled");

        let err = DriverError::InvalidMove {
            name: "ace_selector".to_string(),
            reason: "speed must be positive".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ace_selector") && msg.contains("speed must be positive"));

        let err = DriverError::IndicatorNotFound(3);
        assert_eq!(err.to_string(), "Indicator for lane 3 not found");

        assert_eq!(
            DriverError::ChannelClosed.to_string(),
            "Sensor event channel closed"
        );
    }
}
