//! 日志初始化
//!
//! 安装 `tracing-subscriber` 的 fmt 输出（`RUST_LOG` 优先于默认过滤规则），
//! 并通过 `tracing-log` 把 `log` crate 的记录转发到 tracing。

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

/// 日志初始化错误
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("Global subscriber already installed: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("log bridge already installed: {0}")]
    LogBridge(#[from] log::SetLoggerError),
}

/// 使用默认过滤规则（`info`）初始化日志
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with("info")
}

/// 初始化日志
///
/// `default_filter` 在未设置 `RUST_LOG` 时生效，例如 `"ace_client=debug,info"`。
/// 重复初始化返回错误，不会 panic。
pub fn init_logging_with(default_filter: &str) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    LogTracer::init()?;
    tracing::debug!("Logging initialised");
    Ok(())
}
