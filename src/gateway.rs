//! HTTP 网关
//!
//! 按路径前缀把逻辑端点路由到两个后端之一（`/auth` → 鉴权服务，
//! 其余 → 领域服务），出站时附加 Bearer 装饰，入站时执行故障处理：
//! 鉴权调用返回 401 时同步清除会话并触发登录重定向钩子，
//! 其他错误记录日志后原样上抛（本系统任何地方都不做自动重试）。

use crate::error::{ClientError, ClientResult};
use crate::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::session::SessionSignals;
use crate::storage::StorageAdapter;
use crate::store::SessionStore;
use nexus_shared::protocol::{ServiceKind, is_auth_exempt};
use nexus_shared::{AUTH_HEADER, BEARER_PREFIX};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::rc::Rc;

// =========================================================
// 配置
// =========================================================

/// 双后端的 base URL 配置
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 鉴权服务 (JWT 签发)
    pub auth_base_url: String,
    /// 领域服务 (医生/患者/预约/消息)
    pub domain_base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            auth_base_url: "http://localhost:8082/api".to_string(),
            domain_base_url: "http://localhost:8081/api".to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn new(auth_base_url: impl Into<String>, domain_base_url: impl Into<String>) -> Self {
        Self {
            auth_base_url: auth_base_url.into().trim_end_matches('/').to_string(),
            domain_base_url: domain_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

// =========================================================
// 请求装饰 (Request Decorator)
// =========================================================

/// Bearer 装饰：纯函数，仅由 (请求, 当前 token, 豁免表) 决定
///
/// token 在场且路径不属于三个未鉴权端点时附加
/// `Authorization: Bearer <token>`；无 token 时不改动请求，
/// 由下游 401 处理接管。
pub fn attach_bearer(req: HttpRequest, path: &str, token: Option<&str>) -> HttpRequest {
    match token {
        Some(token) if !is_auth_exempt(path) => {
            req.with_header(AUTH_HEADER, &format!("{}{}", BEARER_PREFIX, token))
        }
        _ => req,
    }
}

/// RFC 3986 非保留字符之外的字节做百分号编码
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

// =========================================================
// 网关本体
// =========================================================

/// 面向两个后端服务的统一 HTTP 门面
///
/// 会话仓库与状态单元以 `Rc` 共享：装饰时在调用点实时读取
/// token，401 故障时就地执行会话拆除。
pub struct ApiGateway<C: HttpClient, S: StorageAdapter> {
    config: GatewayConfig,
    client: C,
    store: Rc<SessionStore<S>>,
    signals: Rc<SessionSignals>,
    /// 401 拆除后的重定向钩子，由嵌入方注册（通常导航到登录页）
    on_unauthorized: RefCell<Option<Box<dyn Fn()>>>,
}

impl<C: HttpClient, S: StorageAdapter> ApiGateway<C, S> {
    pub fn new(
        config: GatewayConfig,
        client: C,
        store: Rc<SessionStore<S>>,
        signals: Rc<SessionSignals>,
    ) -> Self {
        Self {
            config,
            client,
            store,
            signals,
            on_unauthorized: RefCell::new(None),
        }
    }

    /// 注册 401 拆除后的重定向钩子
    pub fn set_unauthorized_hook(&self, hook: impl Fn() + 'static) {
        *self.on_unauthorized.borrow_mut() = Some(Box::new(hook));
    }

    fn base_url(&self, path: &str) -> &str {
        match ServiceKind::for_path(path) {
            ServiceKind::Auth => &self.config.auth_base_url,
            ServiceKind::Domain => &self.config.domain_base_url,
        }
    }

    fn build_url(&self, path: &str, query: &[(String, String)]) -> String {
        let mut url = format!("{}{}", self.base_url(path), path);
        for (i, (k, v)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&encode_component(k));
            url.push('=');
            url.push_str(&encode_component(v));
        }
        url
    }

    /// 发送一个经装饰的请求并执行响应故障处理
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<serde_json::Value>,
    ) -> ClientResult<HttpResponse> {
        let url = self.build_url(path, query);
        let mut req = HttpRequest::new(&url, method);
        if let Some(body) = body {
            req = req.with_json_body(body);
        }

        // 装饰时实时读取存储中的 token
        let token = self.store.access_token();
        let req = attach_bearer(req, path, token.as_deref());

        let resp = self.client.send(req).await?;

        // --- 响应故障处理 (Response Fault Handler) ---
        if resp.status == 401 && !is_auth_exempt(path) {
            log_error!("[ApiGateway] 401 on {} - tearing down session", path);
            self.store.clear();
            self.signals.reset();
            if let Some(hook) = self.on_unauthorized.borrow().as_ref() {
                hook();
            }
            return Err(ClientError::session_expired());
        }

        if !resp.ok() {
            let message = error_message(&resp);
            log_error!("[ApiGateway] HTTP {} on {}: {}", resp.status, path, message);
            return Err(ClientError::http(resp.status, message));
        }

        Ok(resp)
    }

    // --- 类型化的动词助手 ---

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(HttpMethod::Get, path, &[], None).await?.json()
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ClientResult<T> {
        self.send(HttpMethod::Get, path, query, None).await?.json()
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        self.send(HttpMethod::Post, path, &[], Some(body))
            .await?
            .json()
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        self.send(HttpMethod::Put, path, &[], Some(body))
            .await?
            .json()
    }

    /// DELETE 成功时忽略响应体（后端返回 204 或空对象）
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send(HttpMethod::Delete, path, &[], None).await?;
        Ok(())
    }
}

/// 从错误响应体中提取可展示的消息
///
/// 后端错误体形如 `{"error": "..."}`；解析失败时退回原始文本。
fn error_message(resp: &HttpResponse) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: String,
    }
    if let Ok(body) = serde_json::from_str::<ErrorBody>(&resp.body) {
        return body.error;
    }
    if resp.body.is_empty() {
        format!("HTTP {}", resp.status)
    } else {
        resp.body.clone()
    }
}
