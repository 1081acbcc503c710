use serde::{Deserialize, Serialize};

pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const AUTH_HEADER: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";
pub const AUTH_PATH_PREFIX: &str = "/auth";

// =========================================================
// 角色模型 (Role)
// =========================================================

/// 规范化的用户角色
///
/// 后端在不同接口返回两种写法（`"DOCTOR"` 与 `"ROLE_DOCTOR"`），
/// 统一在 [`Role::normalize`] 处归一化，所有调用方只消费此枚举。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    /// 将后端返回的角色字符串归一化为枚举
    ///
    /// 接受 `"PATIENT"`、`"ROLE_PATIENT"` 及任意大小写；
    /// 未知字符串返回 `None`。
    pub fn normalize(raw: &str) -> Option<Role> {
        let upper = raw.trim().to_ascii_uppercase();
        let stripped = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        match stripped {
            "PATIENT" => Some(Role::Patient),
            "DOCTOR" => Some(Role::Doctor),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// 写回存储/请求体时使用的规范写法
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Role::Patient => "PATIENT",
            Role::Doctor => "DOCTOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_wire_str())
    }
}

// =========================================================
// 用户模型 (User)
// =========================================================

/// 后端返回的用户档案
///
/// `role` 保留原始字符串（可能是 `ROLE_*` 写法），
/// 归一化由会话层负责。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: i64,
    pub user_email: String,
    pub name: String,
    pub specialization: String,
    pub license_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i64,
    pub user_email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub user_email: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub patient_id: i64,
    pub patient_name: String,
    /// ISO 日期 (yyyy-mm-dd)
    pub appointment_date: chrono::NaiveDate,
    /// 时刻字符串，后端原样透传 (如 "14:30")
    pub appointment_time: String,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub user_email: String,
    pub sender_id: i64,
    pub sender_name: String,
    pub receiver_id: i64,
    pub receiver_name: String,
    pub content: String,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// 会话列表条目（按聊天对方聚合）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub conversation_id: String,
    pub other_person_id: i64,
    pub other_person_name: String,
    pub last_message: String,
    pub last_message_time: String,
    pub unread_count: u32,
}

// =========================================================
// 分页模型 (Pagination)
// =========================================================

/// 后端分页响应的统一外壳
///
/// 对应 `{content, totalElements, totalPages}`；
/// 后端额外返回的 `pageable` 字段被忽略。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }
}

// =========================================================
// 测试
// =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_accepts_both_wire_spellings() {
        assert_eq!(Role::normalize("DOCTOR"), Some(Role::Doctor));
        assert_eq!(Role::normalize("ROLE_DOCTOR"), Some(Role::Doctor));
        assert_eq!(Role::normalize("role_patient"), Some(Role::Patient));
        assert_eq!(Role::normalize(" Admin "), Some(Role::Admin));
    }

    #[test]
    fn normalize_rejects_unknown_roles() {
        assert_eq!(Role::normalize("NURSE"), None);
        assert_eq!(Role::normalize(""), None);
        assert_eq!(Role::normalize("ROLE_"), None);
    }

    #[test]
    fn page_deserializes_backend_shape() {
        let json = r#"{
            "content": [],
            "totalElements": 42,
            "totalPages": 5,
            "pageable": {"offset": 0}
        }"#;
        let page: Page<Doctor> = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_elements, 42);
        assert_eq!(page.total_pages, 5);
        assert!(page.is_empty());
    }
}
