//! 日志初始化测试（独立进程：全局 subscriber 只能安装一次）

use ace_sdk::{LoggingError, init_logging_with};

#[test]
fn test_init_once_then_error() {
    init_logging_with("ace_client=debug,info").unwrap();
    tracing::info!("logging ready");
    log::info!("forwarded from log");

    assert!(matches!(
        init_logging_with("info"),
        Err(LoggingError::Subscriber(_))
    ));
}
