//! 传感器事件总线
//!
//! 开关量传感器的边沿事件先进入队列，再由宿主事件循环逐个取出分发，
//! 保证回调之间不会重叠，也不会与正在进行的归零/移动重叠。
//!
//! # 使用示例
//!
//! ```rust
//! use ace_driver::{EventBus, SensorEvent};
//! use std::time::Instant;
//!
//! let bus = EventBus::new();
//! let sender = bus.sender();
//!
//! // IO 侧：检测到张力开关上升沿
//! sender.publish(SensorEvent::new("PB1", true, Instant::now())).unwrap();
//!
//! // 事件循环：逐个取出
//! let events: Vec<_> = bus.drain().collect();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].pin, "PB1");
//! ```

use crate::error::DriverError;
use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use std::time::{Duration, Instant};

/// 传感器边沿事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorEvent {
    /// 传感器引脚名称（与配置中的 `*_pin` 一致）
    pub pin: String,
    /// 新电平（true = 触发）
    pub state: bool,
    /// 事件时间（单调时钟）
    pub timestamp: Instant,
}

impl SensorEvent {
    /// 创建事件
    pub fn new(pin: impl Into<String>, state: bool, timestamp: Instant) -> Self {
        Self {
            pin: pin.into(),
            state,
            timestamp,
        }
    }
}

/// 事件发送端（可克隆，交给各个 IO 源）
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<SensorEvent>,
}

impl EventSender {
    /// 发布事件
    ///
    /// 接收端已销毁时返回 `DriverError::ChannelClosed`。
    pub fn publish(&self, event: SensorEvent) -> Result<(), DriverError> {
        self.tx.send(event).map_err(|_| DriverError::ChannelClosed)
    }
}

/// 传感器事件总线
///
/// 无界队列：边沿事件频率受物理开关限制，队列不会无限增长。
#[derive(Debug)]
pub struct EventBus {
    tx: Sender<SensorEvent>,
    rx: Receiver<SensorEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// 创建事件总线
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// 获取发送端
    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// 非阻塞取出一个事件
    pub fn try_next(&self) -> Option<SensorEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// 阻塞等待下一个事件（带超时）
    pub fn next_timeout(&self, timeout: Duration) -> Option<SensorEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// 取出当前队列中的全部事件
    pub fn drain(&self) -> impl Iterator<Item = SensorEvent> + '_ {
        self.rx.try_iter()
    }

    /// 当前排队的事件数量
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_preserve_order() {
        let bus = EventBus::new();
        let sender = bus.sender();
        let t0 = Instant::now();

        sender.publish(SensorEvent::new("PA1", true, t0)).unwrap();
        sender
            .publish(SensorEvent::new("PB1", false, t0 + Duration::from_millis(5)))
            .unwrap();

        assert_eq!(bus.pending(), 2);
        let first = bus.try_next().unwrap();
        assert_eq!(first.pin, "PA1");
        assert!(first.state);

        let rest: Vec<_> = bus.drain().collect();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].pin, "PB1");
        assert!(bus.try_next().is_none());
    }

    #[test]
    fn test_next_timeout_empty() {
        let bus = EventBus::new();
        assert!(bus.next_timeout(Duration::from_millis(1)).is_none());
    }
}
