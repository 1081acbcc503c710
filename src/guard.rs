//! 路由守卫
//!
//! 进入受保护视图前咨询的纯判定函数：只读会话快照，
//! 绝不触发网络请求，调用之间无状态。

use crate::route::AppRoute;
use crate::session::{RoleState, SessionSignals};
use std::rc::Rc;

/// 守卫判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// 放行
    Granted,
    /// 已认证但角色尚未解析：未知，而非未授权——
    /// 视图应等待角色单元更新，而不是拒绝
    RoleUnknown,
    /// 已认证但角色不匹配
    Forbidden,
    /// 未认证，应重定向到登录页
    RedirectToLogin(AppRoute),
}

/// 路由守卫：持有会话状态单元的只读引用
pub struct RouteGuard {
    signals: Rc<SessionSignals>,
}

impl RouteGuard {
    pub fn new(signals: Rc<SessionSignals>) -> Self {
        Self { signals }
    }

    /// 基础判定：当前会话能否进入任一受保护视图
    ///
    /// 返回 true 当且仅当已认证快照为 true。
    pub fn can_enter(&self) -> bool {
        self.signals.is_authenticated.get()
    }

    /// 完整判定：认证 + 角色门控
    pub fn check(&self, route: &AppRoute) -> GuardOutcome {
        if !route.requires_auth() {
            return GuardOutcome::Granted;
        }
        if !self.can_enter() {
            log_info!("[RouteGuard] Access denied for {}. Redirecting to login.", route);
            return GuardOutcome::RedirectToLogin(AppRoute::auth_failure_redirect());
        }
        let Some(required) = route.required_role() else {
            return GuardOutcome::Granted;
        };
        match self.signals.role.get() {
            RoleState::Resolved(role) if role == required => GuardOutcome::Granted,
            RoleState::Resolved(_) => GuardOutcome::Forbidden,
            // 角色缺席 = 尚未可知，不等于未授权
            RoleState::Pending | RoleState::Unavailable => GuardOutcome::RoleUnknown,
        }
    }
}
