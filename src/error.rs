use std::fmt;

// =========================================================
// 错误类别枚举
// =========================================================

/// 错误类别
///
/// 对应客户端错误分类学：凭据/校验类错误原样交给 UI 展示，
/// `SessionExpired` 由网关自动处理，`NoRefreshToken` 是契约违规。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 网络层失败（fetch 未能完成）
    Network,
    /// JSON 解析或序列化失败
    Serialization,
    /// 持久化存储读写失败
    Storage,
    /// 登录凭据被后端拒绝 (4xx on /auth/login)
    InvalidCredentials,
    /// 注册数据校验失败 (400 on /auth/register)
    Validation,
    /// 注册邮箱已存在 (409 on /auth/register)
    DuplicateAccount,
    /// 鉴权调用返回 401，会话已被强制清除
    SessionExpired,
    /// 调用 refresh() 时本地没有 refresh token（契约违规）
    NoRefreshToken,
    /// 其他非 2xx 响应，原样上抛，不重试
    Http,
}

impl ErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Serialization => "JSON_PARSE_ERROR",
            ErrorKind::Storage => "STORAGE_ERROR",
            ErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::DuplicateAccount => "DUPLICATE_ACCOUNT",
            ErrorKind::SessionExpired => "SESSION_EXPIRED",
            ErrorKind::NoRefreshToken => "NO_REFRESH_TOKEN",
            ErrorKind::Http => "HTTP_ERROR",
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端统一错误
///
/// - `kind`: 错误类别
/// - `message`: 可展示的错误消息
/// - `http_status`: 触发该错误的 HTTP 状态码（若有）
#[derive(Debug, Clone)]
pub struct ClientError {
    pub kind: ErrorKind,
    pub message: String,
    pub http_status: Option<u16>,
}

impl ClientError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            http_status: None,
        }
    }

    // --- Convenience constructors ---

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn duplicate_account(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateAccount, message)
    }

    pub fn session_expired() -> Self {
        Self::new(ErrorKind::SessionExpired, "Session expired").with_status(401)
    }

    pub fn no_refresh_token() -> Self {
        Self::new(ErrorKind::NoRefreshToken, "No refresh token available")
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Http, message).with_status(status)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    /// 是否应由 UI 直接展示给用户（凭据/校验类错误）
    pub fn is_displayable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidCredentials | ErrorKind::Validation | ErrorKind::DuplicateAccount
        )
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;
        if let Some(status) = self.http_status {
            write!(f, " (HTTP {})", status)?;
        }
        Ok(())
    }
}

impl std::error::Error for ClientError {}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::serialization(e.to_string())
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
