//! 客户端持久化存储封装
//!
//! 浏览器环境下走 `web_sys::Storage` (LocalStorage)；
//! 非浏览器环境（原生嵌入、测试）提供内存实现。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// 键值存储适配器
///
/// 单线程模型下全部为同步读写；会话层在每次变更时立即落盘，
/// 进程重启后由 `restore()` 回读。
pub trait StorageAdapter {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str) -> bool;
}

// =========================================================
// 实现层: 浏览器 LocalStorage
// =========================================================

/// 浏览器 LocalStorage 适配器
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl StorageAdapter for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn remove(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

// =========================================================
// 实现层: 内存存储
// =========================================================

/// 内存键值存储
///
/// 用于测试和非浏览器嵌入；`Clone` 之后共享同一份底层数据，
/// 便于测试方在外部检查写入结果。
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前存储的条目数
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StorageAdapter for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.get("k").is_none());
        assert!(storage.set("k", "v"));
        assert_eq!(storage.get("k").as_deref(), Some("v"));
        assert!(storage.remove("k"));
        assert!(!storage.remove("k"));
        assert!(storage.is_empty());
    }

    #[test]
    fn clones_share_the_same_entries() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set("k", "v");
        assert_eq!(b.get("k").as_deref(), Some("v"));
    }
}
