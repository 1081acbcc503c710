//! 会话持久化仓库
//!
//! 在键值存储之上提供类型化的会话条目访问：
//! access token、refresh token、序列化的用户档案，
//! 以及角色解析结果（第四个独立条目）。

use crate::error::{ClientError, ClientResult};
use crate::storage::StorageAdapter;
use nexus_shared::{Role, User};

const ACCESS_TOKEN_KEY: &str = "accessToken";
const REFRESH_TOKEN_KEY: &str = "refreshToken";
const USER_KEY: &str = "user";
const USER_ROLE_KEY: &str = "userRole";

/// 类型化的会话存储
///
/// 会话的每次变更都立即写穿到底层存储，进程重启时
/// [`crate::session::SessionManager::restore`] 从这里回读。
pub struct SessionStore<S: StorageAdapter> {
    storage: S,
}

impl<S: StorageAdapter> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// 写穿一个条目；底层存储拒绝写入（如配额耗尽）时报错
    fn persist(&self, key: &str, value: &str) -> ClientResult<()> {
        if self.storage.set(key, value) {
            Ok(())
        } else {
            Err(ClientError::storage(format!("Failed to persist {}", key)))
        }
    }

    // --- Tokens ---

    pub fn set_access_token(&self, token: &str) -> ClientResult<()> {
        self.persist(ACCESS_TOKEN_KEY, token)
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY)
    }

    pub fn set_refresh_token(&self, token: &str) -> ClientResult<()> {
        self.persist(REFRESH_TOKEN_KEY, token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY)
    }

    // --- User profile ---

    pub fn set_user(&self, user: &User) -> ClientResult<()> {
        let json = serde_json::to_string(user)?;
        self.persist(USER_KEY, &json)
    }

    /// 存储中的用户档案；损坏的条目按不存在处理
    pub fn user(&self) -> Option<User> {
        let json = self.storage.get(USER_KEY)?;
        match serde_json::from_str(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                log_warn!("[SessionStore] Discarding corrupt user entry: {}", e);
                None
            }
        }
    }

    // --- Resolved role ---

    pub fn set_role(&self, role: Role) -> ClientResult<()> {
        self.persist(USER_ROLE_KEY, role.as_wire_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.storage
            .get(USER_ROLE_KEY)
            .and_then(|raw| Role::normalize(&raw))
    }

    // --- Lifecycle ---

    /// 是否存在可恢复的会话（用户档案与 access token 同时在场）
    pub fn is_logged_in(&self) -> bool {
        self.access_token().is_some() && self.storage.get(USER_KEY).is_some()
    }

    /// 清空全部四个会话条目；幂等，绝不失败
    pub fn clear(&self) {
        self.storage.remove(ACCESS_TOKEN_KEY);
        self.storage.remove(REFRESH_TOKEN_KEY);
        self.storage.remove(USER_KEY);
        self.storage.remove(USER_ROLE_KEY);
    }
}
