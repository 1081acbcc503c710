use crate::{AUTH_PATH_PREFIX, User};
use serde::{Deserialize, Serialize};

// =========================================================
// Service routing
// =========================================================

/// The two backend services the client talks to.
///
/// Requests whose path starts with `/auth` go to the auth service
/// (JWT issuance); everything else goes to the domain service
/// (doctors / patients / appointments / messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Auth,
    Domain,
}

impl ServiceKind {
    pub fn for_path(path: &str) -> Self {
        if path.starts_with(AUTH_PATH_PREFIX) {
            ServiceKind::Auth
        } else {
            ServiceKind::Domain
        }
    }
}

/// Endpoints that must never carry an `Authorization` header.
pub const NO_AUTH_PATHS: [&str; 3] = ["/auth/login", "/auth/register", "/auth/refresh"];

/// Whether a logical endpoint path is exempt from bearer decoration.
pub fn is_auth_exempt(path: &str) -> bool {
    NO_AUTH_PATHS.iter().any(|p| path.starts_with(p))
}

// =========================================================
// Auth wire shapes
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Shared response shape of `/auth/login`, `/auth/register` and
/// `/auth/refresh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Response of `/auth/me`, used only for role enrichment. Extra
/// profile fields the backend may return are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfoResponse {
    pub role: String,
}

// =========================================================
// Pagination query
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Query parameters of every `/search/paginated` endpoint:
/// `{page, size, sortBy, direction}`.
#[derive(Debug, Clone)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub direction: SortDirection,
}

impl PageQuery {
    pub fn new(page: u32, size: u32, sort_by: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            page,
            size,
            sort_by: sort_by.into(),
            direction,
        }
    }

    /// Key/value pairs in the order the backend documents them.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
            ("sortBy".to_string(), self.sort_by.clone()),
            ("direction".to_string(), self.direction.as_str().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_paths_route_to_auth_service() {
        assert_eq!(ServiceKind::for_path("/auth/login"), ServiceKind::Auth);
        assert_eq!(ServiceKind::for_path("/auth/me"), ServiceKind::Auth);
        assert_eq!(ServiceKind::for_path("/doctors/1"), ServiceKind::Domain);
        assert_eq!(
            ServiceKind::for_path("/appointments/search/paginated"),
            ServiceKind::Domain
        );
    }

    #[test]
    fn exemption_covers_only_the_three_credential_endpoints() {
        assert!(is_auth_exempt("/auth/login"));
        assert!(is_auth_exempt("/auth/register"));
        assert!(is_auth_exempt("/auth/refresh"));
        assert!(!is_auth_exempt("/auth/me"));
        assert!(!is_auth_exempt("/doctors"));
    }

    #[test]
    fn auth_response_uses_camel_case_wire_names() {
        let json = r#"{
            "accessToken": "T1",
            "refreshToken": "R1",
            "user": {"id": 1, "email": "a@b.com", "fullName": "A B", "role": "PATIENT"}
        }"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "T1");
        assert_eq!(resp.user.full_name, "A B");
    }

    #[test]
    fn page_query_pairs_follow_backend_contract() {
        let q = PageQuery::new(0, 10, "name", SortDirection::Asc);
        let pairs = q.query_pairs();
        assert_eq!(pairs[2], ("sortBy".to_string(), "name".to_string()));
        assert_eq!(pairs[3], ("direction".to_string(), "ASC".to_string()));
    }
}
