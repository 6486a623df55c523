//! 运行模式
//!
//! - REPL 模式：交互式 Shell，会话期间保持同一个模拟系统

pub mod repl;
