//! 可观察状态单元
//!
//! 单线程事件循环模型下的观察者列表实现：订阅者注册回调，
//! `set` 同步发布新值。用来承载会话的三个状态单元
//! （当前用户 / 是否已认证 / 角色）。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// 订阅句柄，交给 [`ObservableCell::unsubscribe`] 以取消订阅
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn Fn(&T)>;

/// 持有当前值并向订阅者广播变更的状态单元
///
/// `get` 返回同步快照（守卫逻辑依赖它，不等待订阅回调）；
/// `set` 先写入新值，再按注册顺序同步通知所有订阅者。
pub struct ObservableCell<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<(SubscriptionId, Rc<Subscriber<T>>)>>,
    next_id: Cell<u64>,
}

impl<T: Clone> ObservableCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: RefCell::new(initial),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// 当前值的同步快照
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// 写入新值并同步通知所有订阅者
    pub fn set(&self, new_value: T) {
        *self.value.borrow_mut() = new_value;
        // 先复制订阅者列表再调用，允许回调内再注册/注销订阅
        let subscribers: Vec<Rc<Subscriber<T>>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        let current = self.value.borrow().clone();
        for f in subscribers {
            f(&current);
        }
    }

    /// 注册订阅回调，返回可用于注销的句柄
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.subscribers
            .borrow_mut()
            .push((id, Rc::new(Box::new(f))));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
    }
}

impl<T: Clone + Default> Default for ObservableCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
