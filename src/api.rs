//! 领域服务门面
//!
//! 医生 / 患者 / 预约 / 消息四组类型化 CRUD 门面，
//! 全部是网关之上的薄封装：不持有状态、不重试、
//! 分页默认值与后端文档保持一致。

use crate::error::ClientResult;
use crate::gateway::ApiGateway;
use crate::request::HttpClient;
use crate::storage::StorageAdapter;
use nexus_shared::protocol::{PageQuery, SortDirection};
use nexus_shared::{Appointment, Conversation, Doctor, Message, Page, Patient};
use serde::Serialize;
use std::rc::Rc;

fn pairs(query: PageQuery, extra: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    out.extend(query.query_pairs());
    out
}

// =========================================================
// 医生服务
// =========================================================

pub struct DoctorsApi<C: HttpClient, S: StorageAdapter> {
    gateway: Rc<ApiGateway<C, S>>,
}

impl<C: HttpClient, S: StorageAdapter> DoctorsApi<C, S> {
    pub fn new(gateway: Rc<ApiGateway<C, S>>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, page: u32, size: u32) -> ClientResult<Page<Doctor>> {
        let query = PageQuery::new(page, size, "name", SortDirection::Asc);
        self.gateway
            .get_query("/doctors/search/paginated", &pairs(query, &[]))
            .await
    }

    pub async fn search_by_name(
        &self,
        name: &str,
        page: u32,
        size: u32,
    ) -> ClientResult<Page<Doctor>> {
        let query = PageQuery::new(page, size, "name", SortDirection::Asc);
        self.gateway
            .get_query("/doctors/search/by-name", &pairs(query, &[("name", name)]))
            .await
    }

    pub async fn search_by_specialization(
        &self,
        specialization: &str,
        page: u32,
        size: u32,
    ) -> ClientResult<Page<Doctor>> {
        let query = PageQuery::new(page, size, "specialization", SortDirection::Asc);
        self.gateway
            .get_query(
                "/doctors/search/by-specialization",
                &pairs(query, &[("specialization", specialization)]),
            )
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Doctor> {
        self.gateway.get(&format!("/doctors/{}", id)).await
    }

    pub async fn create(&self, doctor: &impl Serialize) -> ClientResult<Doctor> {
        self.gateway.post("/doctors", doctor).await
    }

    pub async fn update(&self, id: i64, doctor: &impl Serialize) -> ClientResult<Doctor> {
        self.gateway.put(&format!("/doctors/{}", id), doctor).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.gateway.delete(&format!("/doctors/{}", id)).await
    }
}

// =========================================================
// 患者服务
// =========================================================

pub struct PatientsApi<C: HttpClient, S: StorageAdapter> {
    gateway: Rc<ApiGateway<C, S>>,
}

impl<C: HttpClient, S: StorageAdapter> PatientsApi<C, S> {
    pub fn new(gateway: Rc<ApiGateway<C, S>>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, page: u32, size: u32) -> ClientResult<Page<Patient>> {
        let query = PageQuery::new(page, size, "name", SortDirection::Asc);
        self.gateway
            .get_query("/patients/search/paginated", &pairs(query, &[]))
            .await
    }

    pub async fn search_by_name(
        &self,
        name: &str,
        page: u32,
        size: u32,
    ) -> ClientResult<Page<Patient>> {
        let query = PageQuery::new(page, size, "name", SortDirection::Asc);
        self.gateway
            .get_query("/patients/search/by-name", &pairs(query, &[("name", name)]))
            .await
    }

    pub async fn search_by_email(&self, email: &str) -> ClientResult<Patient> {
        self.gateway
            .get_query(
                "/patients/search/by-email",
                &[("email".to_string(), email.to_string())],
            )
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Patient> {
        self.gateway.get(&format!("/patients/{}", id)).await
    }

    /// 当前登录用户对应的患者档案
    pub async fn me(&self) -> ClientResult<Patient> {
        self.gateway.get("/patients/me").await
    }

    pub async fn update_me(&self, patient: &impl Serialize) -> ClientResult<Patient> {
        self.gateway.put("/patients/me", patient).await
    }

    pub async fn create(&self, patient: &impl Serialize) -> ClientResult<Patient> {
        self.gateway.post("/patients", patient).await
    }

    pub async fn update(&self, id: i64, patient: &impl Serialize) -> ClientResult<Patient> {
        self.gateway.put(&format!("/patients/{}", id), patient).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.gateway.delete(&format!("/patients/{}", id)).await
    }
}

// =========================================================
// 预约服务
// =========================================================

pub struct AppointmentsApi<C: HttpClient, S: StorageAdapter> {
    gateway: Rc<ApiGateway<C, S>>,
}

impl<C: HttpClient, S: StorageAdapter> AppointmentsApi<C, S> {
    pub fn new(gateway: Rc<ApiGateway<C, S>>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, page: u32, size: u32) -> ClientResult<Page<Appointment>> {
        let query = PageQuery::new(page, size, "appointmentDate", SortDirection::Desc);
        self.gateway
            .get_query("/appointments/search/paginated", &pairs(query, &[]))
            .await
    }

    /// 按日期区间检索 (ISO 日期字符串，闭区间)
    pub async fn search_by_date_range(
        &self,
        start: &str,
        end: &str,
        page: u32,
        size: u32,
    ) -> ClientResult<Page<Appointment>> {
        let query = PageQuery::new(page, size, "appointmentDate", SortDirection::Desc);
        self.gateway
            .get_query(
                "/appointments/search/by-date-range",
                &pairs(query, &[("start", start), ("end", end)]),
            )
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Appointment> {
        self.gateway.get(&format!("/appointments/{}", id)).await
    }

    pub async fn book(&self, appointment: &impl Serialize) -> ClientResult<Appointment> {
        self.gateway.post("/appointments", appointment).await
    }

    pub async fn update(&self, id: i64, appointment: &impl Serialize) -> ClientResult<Appointment> {
        self.gateway
            .put(&format!("/appointments/{}", id), appointment)
            .await
    }

    pub async fn cancel(&self, id: i64) -> ClientResult<()> {
        self.gateway.delete(&format!("/appointments/{}", id)).await
    }
}

// =========================================================
// 消息服务
// =========================================================

pub struct MessagesApi<C: HttpClient, S: StorageAdapter> {
    gateway: Rc<ApiGateway<C, S>>,
}

impl<C: HttpClient, S: StorageAdapter> MessagesApi<C, S> {
    pub fn new(gateway: Rc<ApiGateway<C, S>>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, page: u32, size: u32) -> ClientResult<Page<Message>> {
        let query = PageQuery::new(page, size, "createdAt", SortDirection::Desc);
        self.gateway
            .get_query("/messages/search/paginated", &pairs(query, &[]))
            .await
    }

    pub async fn search_by_content(
        &self,
        content: &str,
        page: u32,
        size: u32,
    ) -> ClientResult<Page<Message>> {
        let query = PageQuery::new(page, size, "createdAt", SortDirection::Desc);
        self.gateway
            .get_query(
                "/messages/search/by-content",
                &pairs(query, &[("content", content)]),
            )
            .await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Message> {
        self.gateway.get(&format!("/messages/{}", id)).await
    }

    pub async fn send(&self, message: &impl Serialize) -> ClientResult<Message> {
        self.gateway.post("/messages", message).await
    }

    pub async fn update(&self, id: i64, message: &impl Serialize) -> ClientResult<Message> {
        self.gateway.put(&format!("/messages/{}", id), message).await
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.gateway.delete(&format!("/messages/{}", id)).await
    }

    /// 会话列表（按聊天对方聚合）
    pub async fn conversations(&self, page: u32, size: u32) -> ClientResult<Page<Conversation>> {
        self.gateway
            .get_query(
                "/messages/conversations",
                &[
                    ("page".to_string(), page.to_string()),
                    ("size".to_string(), size.to_string()),
                ],
            )
            .await
    }

    /// 与某人的完整对话
    pub async fn conversation_with(
        &self,
        person_id: i64,
        page: u32,
        size: u32,
    ) -> ClientResult<Page<Message>> {
        self.gateway
            .get_query(
                &format!("/messages/conversation/{}", person_id),
                &[
                    ("page".to_string(), page.to_string()),
                    ("size".to_string(), size.to_string()),
                ],
            )
            .await
    }
}
