//! 传感器事件分发
//!
//! IO 侧把开关边沿发布到 [`EventBus`]，宿主事件循环通过 [`Reactor`] 逐个取出，
//! 再由 [`SensorRouter`] 按引脚名称交给对应的单元或控制器。
//! 同一时刻只处理一个事件，回调之间不会重叠。
//!
//! # 使用示例
//!
//! ```rust
//! use ace_client::{Reactor, SensorRouter, SensorTarget, TensionAssist, TensionSettings};
//! use ace_driver::SensorEvent;
//! use ace_driver::mock::MockPrintMonitor;
//! use std::sync::Arc;
//! use std::time::Instant;
//!
//! let print = Arc::new(MockPrintMonitor::new());
//! let assist = Arc::new(TensionAssist::new("ACE_tension1", TensionSettings::default(), print));
//!
//! let mut router = SensorRouter::new();
//! router.register("PB1", SensorTarget::Tension(assist.clone()));
//!
//! let reactor = Reactor::new(router);
//! reactor.sender().publish(SensorEvent::new("PB1", true, Instant::now())).unwrap();
//! assert_eq!(reactor.run_pending(), 1);
//! assert!(assist.tension_level());
//! ```

use crate::control::TensionAssist;
use crate::selector::AceUnit;
use ace_driver::{EventBus, EventSender, SensorEvent};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};

/// 边沿事件的接收方
#[derive(Clone)]
pub enum SensorTarget {
    /// 单元归零开关
    Home(Arc<AceUnit>),
    /// 单元公共张力开关
    CommonTension(Arc<AceUnit>),
    /// 张力辅助控制器的张力开关
    Tension(Arc<TensionAssist>),
}

impl SensorTarget {
    fn deliver(&self, event: &SensorEvent) {
        match self {
            SensorTarget::Home(unit) => unit.on_home_edge(event.state),
            SensorTarget::CommonTension(unit) => unit.on_common_tension_edge(event.state),
            SensorTarget::Tension(assist) => {
                assist.on_tension_edge(event.timestamp, event.state);
            },
        }
    }
}

impl fmt::Debug for SensorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorTarget::Home(unit) => write!(f, "Home({})", unit.name()),
            SensorTarget::CommonTension(unit) => write!(f, "CommonTension({})", unit.name()),
            SensorTarget::Tension(assist) => write!(f, "Tension({})", assist.name()),
        }
    }
}

/// 按引脚名称路由边沿事件
///
/// 同一引脚可以注册多个接收方，按注册顺序依次调用。
#[derive(Debug, Default, Clone)]
pub struct SensorRouter {
    routes: HashMap<String, Vec<SensorTarget>>,
}

impl SensorRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册接收方
    pub fn register(&mut self, pin: impl Into<String>, target: SensorTarget) {
        self.routes.entry(pin.into()).or_default().push(target);
    }

    /// 已注册的引脚
    pub fn pins(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// 分发一个事件，返回被调用的接收方数量
    ///
    /// 未注册的引脚记录警告后丢弃。
    pub fn dispatch(&self, event: &SensorEvent) -> usize {
        let Some(targets) = self.routes.get(&event.pin) else {
            warn!("Dropping edge on unregistered pin {}", event.pin);
            return 0;
        };
        for target in targets {
            trace!(?target, "{} -> {}", event.pin, event.state);
            target.deliver(event);
        }
        targets.len()
    }
}

/// 单线程事件循环
#[derive(Debug)]
pub struct Reactor {
    bus: EventBus,
    router: SensorRouter,
}

impl Reactor {
    pub fn new(router: SensorRouter) -> Self {
        Self {
            bus: EventBus::new(),
            router,
        }
    }

    /// 获取事件发送端（交给 IO 侧）
    pub fn sender(&self) -> EventSender {
        self.bus.sender()
    }

    pub fn router(&self) -> &SensorRouter {
        &self.router
    }

    /// 处理当前排队的所有事件，返回处理的事件数量
    pub fn run_pending(&self) -> usize {
        let mut handled = 0;
        for event in self.bus.drain() {
            self.router.dispatch(&event);
            handled += 1;
        }
        handled
    }

    /// 等待并处理一个事件（带超时）
    ///
    /// 超时返回 false。
    pub fn run_once(&self, timeout: Duration) -> bool {
        match self.bus.next_timeout(timeout) {
            Some(event) => {
                self.router.dispatch(&event);
                true
            },
            None => false,
        }
    }
}
