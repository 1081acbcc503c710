//! 会话管理
//!
//! “当前登录者与其角色”的唯一事实来源。对外暴露三个可独立
//! 订阅的状态单元（当前用户 / 是否已认证 / 角色）以及同步快照
//! 访问器；login / register / refresh 共享同一套持久化契约：
//! 先落盘 token，再发布已认证状态，最后尽力解析角色。
//!
//! 并发防护：每次鉴权调用领取单调递增的序列号，只有仍持有
//! 最新序列号的响应才允许发布（logout 也会推进序列号，
//! 因此用户主动放弃的会话不会被迟到的响应复活）。

use crate::error::{ClientError, ClientResult, ErrorKind};
use crate::gateway::ApiGateway;
use crate::observable::ObservableCell;
use crate::request::HttpClient;
use crate::storage::StorageAdapter;
use crate::store::SessionStore;
use nexus_shared::protocol::{
    AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, UserInfoResponse,
};
use nexus_shared::{Role, User};
use std::cell::Cell;
use std::rc::Rc;

// =========================================================
// 角色三态
// =========================================================

/// 角色解析状态
///
/// 角色通过二次请求 `/auth/me` 异步补全，合法地滞后于已认证
/// 状态。三态让 UI 与守卫能区分“尚未解析”与“解析失败”：
/// 角色缺席是“未知”，不是“未授权”。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleState {
    /// 尚未解析（刚认证成功，或无会话）
    #[default]
    Pending,
    /// 解析成功
    Resolved(Role),
    /// 解析失败；token 仍然有效
    Unavailable,
}

impl RoleState {
    pub fn resolved(&self) -> Option<Role> {
        match self {
            RoleState::Resolved(role) => Some(*role),
            _ => None,
        }
    }
}

// =========================================================
// 会话状态单元
// =========================================================

/// 会话的三个可观察状态单元 + 鉴权序列号
///
/// 顺序约定：同一次鉴权调用内 token 落盘先于已认证发布；
/// 落盘被存储层拒绝时只记录日志，会话仅存在于内存中。
#[derive(Default)]
pub struct SessionSignals {
    pub current_user: ObservableCell<Option<User>>,
    pub is_authenticated: ObservableCell<bool>,
    pub role: ObservableCell<RoleState>,
    auth_seq: Cell<u64>,
}

impl SessionSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// 领取新的鉴权序列号（同时使所有在途鉴权响应失效）
    pub(crate) fn begin_auth(&self) -> u64 {
        let next = self.auth_seq.get() + 1;
        self.auth_seq.set(next);
        next
    }

    /// 序列号是否仍是最新（允许发布）
    pub(crate) fn is_current(&self, seq: u64) -> bool {
        self.auth_seq.get() == seq
    }

    /// 同步清空三个状态单元并推进序列号
    ///
    /// logout 与 401 拆除共用；幂等。
    pub fn reset(&self) {
        self.auth_seq.set(self.auth_seq.get() + 1);
        self.current_user.set(None);
        self.is_authenticated.set(false);
        self.role.set(RoleState::Pending);
    }
}

// =========================================================
// 会话管理器
// =========================================================

pub struct SessionManager<C: HttpClient, S: StorageAdapter> {
    store: Rc<SessionStore<S>>,
    signals: Rc<SessionSignals>,
    gateway: Rc<ApiGateway<C, S>>,
}

impl<C: HttpClient, S: StorageAdapter> SessionManager<C, S> {
    pub fn new(
        gateway: Rc<ApiGateway<C, S>>,
        store: Rc<SessionStore<S>>,
        signals: Rc<SessionSignals>,
    ) -> Self {
        Self {
            store,
            signals,
            gateway,
        }
    }

    pub fn signals(&self) -> Rc<SessionSignals> {
        self.signals.clone()
    }

    pub fn gateway(&self) -> Rc<ApiGateway<C, S>> {
        self.gateway.clone()
    }

    // --- 鉴权操作 ---

    /// 登录
    ///
    /// 成功时按固定顺序落盘并发布，然后尽力解析角色；
    /// 凭据被拒时返回 `InvalidCredentials`，由调用方决定 UI 文案。
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<AuthResponse> {
        let seq = self.signals.begin_auth();
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: AuthResponse = self
            .gateway
            .post("/auth/login", &req)
            .await
            .map_err(classify_login_error)?;
        log_info!("[SessionManager] Login succeeded for {}", resp.user.email);
        self.publish_auth(seq, &resp).await;
        Ok(resp)
    }

    /// 注册
    ///
    /// 持久化契约与 login 相同；400 → `Validation`，
    /// 409 → `DuplicateAccount`。
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> ClientResult<AuthResponse> {
        let seq = self.signals.begin_auth();
        let req = RegisterRequest {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.as_wire_str().to_string(),
        };
        let resp: AuthResponse = self
            .gateway
            .post("/auth/register", &req)
            .await
            .map_err(classify_register_error)?;
        log_info!("[SessionManager] Registered {}", resp.user.email);
        self.publish_auth(seq, &resp).await;
        Ok(resp)
    }

    /// 用 refresh token 换取新的 token 对
    ///
    /// 本地没有 refresh token 属于契约违规，立即失败，
    /// 不发起网络请求——调用方应先检查 `is_authenticated()`。
    pub async fn refresh(&self) -> ClientResult<AuthResponse> {
        let refresh_token = self
            .store
            .refresh_token()
            .ok_or_else(ClientError::no_refresh_token)?;
        let seq = self.signals.begin_auth();
        let resp: AuthResponse = self
            .gateway
            .post("/auth/refresh", &RefreshRequest { refresh_token })
            .await?;
        log_info!("[SessionManager] Tokens refreshed");
        self.publish_auth(seq, &resp).await;
        Ok(resp)
    }

    /// 注销：清空存储与三个状态单元，不调用后端
    ///
    /// token 被直接抛弃（无状态 JWT 语义）；绝不失败，幂等。
    pub fn logout(&self) {
        self.store.clear();
        self.signals.reset();
        log_info!("[SessionManager] Logged out");
    }

    /// 启动时从持久化存储恢复会话，不接触后端
    ///
    /// 用户档案与 access token 同时在场才恢复（含已持久化的
    /// 角色）；否则发布空会话。
    pub fn restore(&self) {
        if self.store.is_logged_in() {
            if let Some(user) = self.store.user() {
                let role = self
                    .store
                    .role()
                    .map(RoleState::Resolved)
                    .unwrap_or(RoleState::Pending);
                log_info!("[SessionManager] Session restored: {}", user.email);
                self.signals.current_user.set(Some(user));
                self.signals.is_authenticated.set(true);
                self.signals.role.set(role);
                return;
            }
        }
        log_info!("[SessionManager] No previous session found");
        self.store.clear();
        self.signals.current_user.set(None);
        self.signals.is_authenticated.set(false);
        self.signals.role.set(RoleState::Pending);
    }

    // --- 同步快照 ---

    pub fn is_authenticated(&self) -> bool {
        self.signals.is_authenticated.get()
    }

    pub fn current_user(&self) -> Option<User> {
        self.signals.current_user.get()
    }

    /// 已解析的角色；`Pending` 和 `Unavailable` 都返回 `None`
    pub fn current_role(&self) -> Option<Role> {
        self.signals.role.get().resolved()
    }

    pub fn role_state(&self) -> RoleState {
        self.signals.role.get()
    }

    // --- 内部流程 ---

    /// 鉴权成功后的统一发布流程
    ///
    /// 顺序保证：token 落盘 → 发布用户 → 发布已认证 →
    /// 角色置 Pending → 尝试解析角色。
    /// 序列号已过期的响应整体跳过（不落盘也不发布）。
    async fn publish_auth(&self, seq: u64, resp: &AuthResponse) {
        if !self.signals.is_current(seq) {
            log_warn!("[SessionManager] Dropping stale auth response (seq {})", seq);
            return;
        }
        // 落盘失败只影响下次重启的恢复，不回滚本次鉴权
        if let Err(e) = self.persist_session(resp) {
            log_error!("[SessionManager] Failed to persist session: {}", e);
        }
        self.signals.current_user.set(Some(resp.user.clone()));
        self.signals.is_authenticated.set(true);
        self.signals.role.set(RoleState::Pending);
        self.resolve_role(seq).await;
    }

    /// token 对与用户档案写穿到持久化存储
    fn persist_session(&self, resp: &AuthResponse) -> ClientResult<()> {
        self.store.set_access_token(&resp.access_token)?;
        self.store.set_refresh_token(&resp.refresh_token)?;
        self.store.set_user(&resp.user)
    }

    /// 用刚获取的 token 调 `/auth/me` 补全角色
    ///
    /// 角色是增益而非认证前提：失败只记录日志并把角色置为
    /// `Unavailable`，外层鉴权调用照常成功。
    async fn resolve_role(&self, seq: u64) {
        match self.gateway.get::<UserInfoResponse>("/auth/me").await {
            Ok(info) => {
                if !self.signals.is_current(seq) {
                    return;
                }
                match Role::normalize(&info.role) {
                    Some(role) => {
                        if let Err(e) = self.store.set_role(role) {
                            log_warn!("[SessionManager] Failed to persist role: {}", e);
                        }
                        self.signals.role.set(RoleState::Resolved(role));
                        log_info!("[SessionManager] Role resolved: {}", role);
                    }
                    None => {
                        log_warn!("[SessionManager] Unknown role from /auth/me: {}", info.role);
                        self.signals.role.set(RoleState::Unavailable);
                    }
                }
            }
            Err(e) => {
                log_warn!(
                    "[SessionManager] Role fetch failed, auth still succeeded: {}",
                    e
                );
                // 401 拆除已推进序列号，此时不再写入角色单元
                if self.signals.is_current(seq) {
                    self.signals.role.set(RoleState::Unavailable);
                }
            }
        }
    }
}

// =========================================================
// 错误分类
// =========================================================

/// /auth/login 的 4xx 统一归为凭据被拒
fn classify_login_error(e: ClientError) -> ClientError {
    match (e.kind, e.http_status) {
        (ErrorKind::Http, Some(status)) if (400..=403).contains(&status) => {
            ClientError::invalid_credentials("Invalid email or password").with_status(status)
        }
        _ => e,
    }
}

/// /auth/register 的 400 → 校验失败，409 → 账号已存在
fn classify_register_error(e: ClientError) -> ClientError {
    match (e.kind, e.http_status) {
        (ErrorKind::Http, Some(409)) => {
            ClientError::duplicate_account("An account with this email already exists")
                .with_status(409)
        }
        (ErrorKind::Http, Some(400)) => {
            ClientError::validation(e.message.clone()).with_status(400)
        }
        _ => e,
    }
}

#[cfg(test)]
mod tests;
