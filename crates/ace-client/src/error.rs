//! 客户端层错误类型

use ace_driver::DriverError;
use ace_protocol::ProtocolError;
use thiserror::Error;

/// 选择器定位/归零错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectorError {
    /// 爬行预算用尽仍未检测到归零开关
    #[error("Failed to home {unit}")]
    HomingFailed { unit: String, moves: u32 },
    /// 执行器错误
    #[error("Actuator error: {0}")]
    Actuator(#[from] DriverError),
    /// 通道不属于该单元
    #[error("Lane '{lane}' does not belong to {unit}")]
    UnknownLane { unit: String, lane: String },
    /// 通道所属单元已销毁
    #[error("Unit owning lane '{lane}' is no longer available")]
    UnitDropped { lane: String },
}

/// 单元装配错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// 引用的执行器不存在
    #[error(
        "No config found for {role}: {actuator} in [AFC_ACE {unit}]. \
         Please make sure [AFC_stepper {actuator}] section exists in your config"
    )]
    MissingActuator {
        role: &'static str,
        actuator: String,
        unit: String,
    },
    /// 构建器缺少必需组件
    #[error("Unit {unit} is missing {component}")]
    MissingComponent {
        unit: String,
        component: &'static str,
    },
    /// 通道编号不连续或重复
    #[error("Invalid lane layout for {unit}: {reason}")]
    InvalidLaneLayout { unit: String, reason: String },
    /// 几何参数超出范围
    #[error("Invalid selector geometry for {unit}: {source}")]
    InvalidGeometry {
        unit: String,
        #[source]
        source: ProtocolError,
    },
}

/// 命令执行错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Malformed parameter '{0}' (expected KEY=VALUE)")]
    MalformedParameter(String),
    #[error("{command} requires parameter {key}")]
    MissingParameter { command: String, key: &'static str },
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidParameter {
        key: &'static str,
        value: String,
        reason: String,
    },
    /// `UNIT=`/`TENSION=` 指向的对象不存在
    #[error("No {kind} named '{name}'")]
    UnknownTarget { kind: &'static str, name: String },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Selector(#[from] SelectorError),
}
