//! Nexus Health 客户端会话核心
//!
//! 面向移动端单页应用的会话/鉴权层，采用高内聚低耦合架构：
//! - `store`: 持久化存储（token 对 + 用户档案 + 角色）
//! - `gateway`: HTTP 网关（双后端路由 + Bearer 装饰 + 401 故障处理）
//! - `session`: 会话管理（三个可观察状态单元 + 并发防护序列号）
//! - `guard` / `route`: 路由守卫（纯快照判定，不触发网络）
//! - `api`: 领域服务（医生/患者/预约/消息的薄 CRUD 门面）

// =========================================================
// 跨平台日志宏
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info {
    ($($t:tt)*) => (web_sys::console::log_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info {
    ($($t:tt)*) => (println!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_warn {
    ($($t:tt)*) => (web_sys::console::warn_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_warn {
    ($($t:tt)*) => (eprintln!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_error {
    ($($t:tt)*) => (web_sys::console::error_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error {
    ($($t:tt)*) => (eprintln!($($t)*))
}

pub mod api;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod observable;
pub mod request;
pub mod route;
pub mod session;
pub mod storage;
pub mod store;

pub use error::{ClientError, ClientResult, ErrorKind};
pub use gateway::{ApiGateway, GatewayConfig};
pub use session::{RoleState, SessionManager, SessionSignals};
pub use store::SessionStore;
