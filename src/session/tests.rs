use super::*;
use crate::gateway::GatewayConfig;
use crate::request::mock::MockHttpClient;
use crate::storage::MemoryStorage;
use serde_json::json;
use std::cell::RefCell;

// =========================================================
// 辅助函数
// =========================================================

struct TestEnv {
    client: MockHttpClient,
    storage: MemoryStorage,
    store: Rc<SessionStore<MemoryStorage>>,
    signals: Rc<SessionSignals>,
    manager: Rc<SessionManager<MockHttpClient, MemoryStorage>>,
}

fn setup() -> TestEnv {
    setup_with_storage(MemoryStorage::new())
}

/// 复用既有存储构造一套全新的会话环境（模拟进程重启）
fn setup_with_storage(storage: MemoryStorage) -> TestEnv {
    let client = MockHttpClient::new();
    let store = Rc::new(SessionStore::new(storage.clone()));
    let signals = Rc::new(SessionSignals::new());
    let gateway = Rc::new(ApiGateway::new(
        GatewayConfig::default(),
        client.clone(),
        store.clone(),
        signals.clone(),
    ));
    let manager = Rc::new(SessionManager::new(gateway, store.clone(), signals.clone()));
    TestEnv {
        client,
        storage,
        store,
        signals,
        manager,
    }
}

fn auth_body() -> serde_json::Value {
    json!({
        "accessToken": "T1",
        "refreshToken": "R1",
        "user": {"id": 1, "email": "a@b.com", "fullName": "A B", "role": "PATIENT"}
    })
}

fn mock_login_ok(env: &TestEnv) {
    env.client.mock_response("/auth/login", 200, auth_body());
    env.client
        .mock_response("/auth/me", 200, json!({"role": "ROLE_PATIENT"}));
}

// =========================================================
// login
// =========================================================

#[tokio::test]
async fn successful_login_publishes_session_and_resolves_role() {
    let env = setup();
    mock_login_ok(&env);

    let resp = env.manager.login("a@b.com", "secret1").await.unwrap();

    assert_eq!(resp.access_token, "T1");
    assert_eq!(resp.refresh_token, "R1");
    assert_eq!(resp.user.id, 1);

    assert!(env.manager.is_authenticated());
    assert_eq!(env.manager.current_user().unwrap().email, "a@b.com");
    assert_eq!(env.manager.current_role(), Some(Role::Patient));

    // 四个条目全部落盘
    assert_eq!(env.store.access_token().as_deref(), Some("T1"));
    assert_eq!(env.store.refresh_token().as_deref(), Some("R1"));
    assert_eq!(env.store.user().unwrap().full_name, "A B");
    assert_eq!(env.store.role(), Some(Role::Patient));
}

#[tokio::test]
async fn login_publishes_cells_in_the_documented_order() {
    let env = setup();
    mock_login_ok(&env);

    let events = Rc::new(RefCell::new(Vec::new()));

    let store = env.store.clone();
    let log = events.clone();
    env.signals.current_user.subscribe(move |user| {
        log.borrow_mut()
            .push(format!("user:{}", user.as_ref().map(|u| u.email.as_str()).unwrap_or("-")));
    });
    let log = events.clone();
    env.signals.is_authenticated.subscribe(move |auth| {
        // 已认证发布时 token 必须已经落盘
        assert!(!*auth || store.access_token().is_some());
        log.borrow_mut().push(format!("auth:{}", auth));
    });
    let log = events.clone();
    env.signals.role.subscribe(move |role| {
        log.borrow_mut().push(format!("role:{:?}", role));
    });

    env.manager.login("a@b.com", "secret1").await.unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            "user:a@b.com".to_string(),
            "auth:true".to_string(),
            "role:Pending".to_string(),
            format!("role:{:?}", RoleState::Resolved(Role::Patient)),
        ]
    );
}

#[tokio::test]
async fn rejected_credentials_leave_the_store_untouched() {
    let env = setup();
    env.client
        .mock_response("/auth/login", 401, json!({"error": "Bad credentials"}));

    let err = env.manager.login("a@b.com", "wrong").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    assert!(err.is_displayable());
    assert!(!env.manager.is_authenticated());
    assert!(env.manager.current_user().is_none());
    assert!(env.storage.is_empty());
}

// =========================================================
// register
// =========================================================

#[tokio::test]
async fn register_follows_the_same_persistence_contract_as_login() {
    let env = setup();
    env.client.mock_response("/auth/register", 200, auth_body());
    env.client
        .mock_response("/auth/me", 200, json!({"role": "PATIENT"}));

    env.manager
        .register("A B", "a@b.com", "secret1", Role::Patient)
        .await
        .unwrap();

    let req = env.client.last_request_to("/auth/register").unwrap();
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["fullName"], "A B");
    assert_eq!(body["role"], "PATIENT");

    assert!(env.manager.is_authenticated());
    assert_eq!(env.store.access_token().as_deref(), Some("T1"));
    assert_eq!(env.manager.current_role(), Some(Role::Patient));
}

#[tokio::test]
async fn register_maps_validation_and_conflict_errors() {
    let env = setup();
    env.client
        .mock_response("/auth/register", 409, json!({"error": "Email already registered"}));
    let err = env
        .manager
        .register("A B", "a@b.com", "secret1", Role::Patient)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateAccount);

    let env = setup();
    env.client
        .mock_response("/auth/register", 400, json!({"error": "Password too short"}));
    let err = env
        .manager
        .register("A B", "a@b.com", "x", Role::Patient)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, "Password too short");
}

// =========================================================
// logout
// =========================================================

#[tokio::test]
async fn logout_clears_everything_and_is_idempotent() {
    let env = setup();
    mock_login_ok(&env);
    env.manager.login("a@b.com", "secret1").await.unwrap();

    env.manager.logout();

    assert!(!env.manager.is_authenticated());
    assert!(env.manager.current_user().is_none());
    assert_eq!(env.manager.current_role(), None);
    assert_eq!(env.manager.role_state(), RoleState::Pending);
    assert!(env.storage.is_empty());
    // 没有任何注销后端调用（无状态 JWT 语义）
    assert_eq!(env.client.request_count(), 2);

    // 幂等：重复注销得到同样的终态
    env.manager.logout();
    assert!(!env.manager.is_authenticated());
    assert!(env.storage.is_empty());
}

// =========================================================
// refresh
// =========================================================

#[tokio::test]
async fn refresh_without_a_token_fails_fast_without_network() {
    let env = setup();

    let err = env.manager.refresh().await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::NoRefreshToken);
    assert_eq!(env.client.request_count(), 0);
}

#[tokio::test]
async fn refresh_re_persists_tokens_and_re_resolves_role() {
    let env = setup();
    mock_login_ok(&env);
    env.manager.login("a@b.com", "secret1").await.unwrap();

    let env2 = setup_with_storage(env.storage.clone());
    env2.client.mock_response(
        "/auth/refresh",
        200,
        json!({
            "accessToken": "T2",
            "refreshToken": "R2",
            "user": {"id": 1, "email": "a@b.com", "fullName": "A B", "role": "PATIENT"}
        }),
    );
    env2.client
        .mock_response("/auth/me", 200, json!({"role": "PATIENT"}));

    env2.manager.refresh().await.unwrap();

    let req = env2.client.last_request_to("/auth/refresh").unwrap();
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["refreshToken"], "R1");

    assert_eq!(env2.store.access_token().as_deref(), Some("T2"));
    assert_eq!(env2.store.refresh_token().as_deref(), Some("R2"));
    assert!(env2.manager.is_authenticated());
    assert_eq!(env2.manager.current_role(), Some(Role::Patient));
}

// =========================================================
// restore（进程重启）
// =========================================================

#[tokio::test]
async fn restore_round_trips_a_persisted_session() {
    let env = setup();
    mock_login_ok(&env);
    env.manager.login("a@b.com", "secret1").await.unwrap();

    // 模拟进程重启：同一份存储，全新的会话环境
    let env2 = setup_with_storage(env.storage.clone());
    assert!(!env2.manager.is_authenticated());

    env2.manager.restore();

    assert!(env2.manager.is_authenticated());
    assert_eq!(env2.manager.current_user().unwrap().email, "a@b.com");
    assert_eq!(env2.manager.current_role(), Some(Role::Patient));
    // 恢复不接触后端
    assert_eq!(env2.client.request_count(), 0);
}

#[test]
fn restore_without_a_stored_session_publishes_the_empty_session() {
    let env = setup();
    env.manager.restore();

    assert!(!env.manager.is_authenticated());
    assert!(env.manager.current_user().is_none());
    assert_eq!(env.manager.role_state(), RoleState::Pending);
}

#[test]
fn restore_requires_both_user_and_access_token() {
    let storage = MemoryStorage::new();
    storage.set("accessToken", "T1");
    // 有 token 没有用户档案：按无会话处理，残留条目被清掉
    let env = setup_with_storage(storage);
    env.manager.restore();

    assert!(!env.manager.is_authenticated());
    assert!(env.storage.is_empty());
}

// =========================================================
// 角色解析
// =========================================================

#[tokio::test]
async fn role_failure_does_not_roll_back_token_persistence() {
    let env = setup();
    env.client.mock_response("/auth/login", 200, auth_body());
    env.client
        .mock_response("/auth/me", 500, json!({"error": "Internal server error"}));

    env.manager.login("a@b.com", "secret1").await.unwrap();

    assert!(env.manager.is_authenticated());
    assert_eq!(env.store.access_token().as_deref(), Some("T1"));
    assert_eq!(env.manager.current_role(), None);
    assert_eq!(env.manager.role_state(), RoleState::Unavailable);
    assert_eq!(env.store.role(), None);
}

#[tokio::test]
async fn login_still_succeeds_when_persistence_is_rejected() {
    struct ReadOnlyStorage;
    impl StorageAdapter for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }
        fn set(&self, _key: &str, _value: &str) -> bool {
            false
        }
        fn remove(&self, _key: &str) -> bool {
            false
        }
    }

    let client = MockHttpClient::new();
    let store = Rc::new(SessionStore::new(ReadOnlyStorage));
    let signals = Rc::new(SessionSignals::new());
    let gateway = Rc::new(ApiGateway::new(
        GatewayConfig::default(),
        client.clone(),
        store.clone(),
        signals.clone(),
    ));
    let manager = SessionManager::new(gateway, store.clone(), signals);
    client.mock_response("/auth/login", 200, auth_body());
    client.mock_response("/auth/me", 200, json!({"role": "PATIENT"}));

    manager.login("a@b.com", "secret1").await.unwrap();

    // 内存中的会话照常建立，只是重启后无法恢复
    assert!(manager.is_authenticated());
    assert_eq!(manager.current_role(), Some(Role::Patient));
    assert!(store.access_token().is_none());
}

#[tokio::test]
async fn unknown_role_strings_leave_the_role_unavailable() {
    let env = setup();
    env.client.mock_response("/auth/login", 200, auth_body());
    env.client
        .mock_response("/auth/me", 200, json!({"role": "NURSE"}));

    env.manager.login("a@b.com", "secret1").await.unwrap();

    assert!(env.manager.is_authenticated());
    assert_eq!(env.manager.role_state(), RoleState::Unavailable);
}

#[tokio::test]
async fn legacy_role_spelling_is_normalized_at_the_boundary() {
    let env = setup();
    env.client.mock_response("/auth/login", 200, auth_body());
    env.client
        .mock_response("/auth/me", 200, json!({"role": "ROLE_ADMIN"}));

    env.manager.login("a@b.com", "secret1").await.unwrap();

    assert_eq!(env.manager.current_role(), Some(Role::Admin));
    assert_eq!(env.store.role(), Some(Role::Admin));
}

// =========================================================
// 401 拆除与并发防护
// =========================================================

#[tokio::test]
async fn a_401_on_a_crud_call_matches_the_post_logout_state() {
    let env = setup();
    mock_login_ok(&env);
    env.manager.login("a@b.com", "secret1").await.unwrap();

    env.client
        .mock_response("/doctors", 401, json!({"error": "Token expired"}));
    let err = env
        .manager
        .gateway()
        .get::<serde_json::Value>("/doctors/search/paginated")
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::SessionExpired);
    assert!(!env.manager.is_authenticated());
    assert!(env.manager.current_user().is_none());
    assert_eq!(env.manager.role_state(), RoleState::Pending);
    assert!(env.storage.is_empty());
}

#[tokio::test]
async fn a_logout_fences_out_an_in_flight_login() {
    let env = setup();
    mock_login_ok(&env);

    // 在登录响应抵达前注销：后到的响应不得复活会话
    let manager = env.manager.clone();
    env.client.set_before_send(move |req| {
        if req.url.contains("/auth/login") {
            manager.logout();
        }
    });

    let resp = env.manager.login("a@b.com", "secret1").await.unwrap();

    // 响应仍交还给调用方，但既不落盘也不发布
    assert_eq!(resp.access_token, "T1");
    assert!(!env.manager.is_authenticated());
    assert!(env.manager.current_user().is_none());
    assert!(env.storage.is_empty());
    // 被防护的登录不再发起角色解析
    assert_eq!(env.client.request_count(), 1);
}

#[test]
fn each_auth_attempt_invalidates_the_previous_sequence() {
    let signals = SessionSignals::new();
    let first = signals.begin_auth();
    assert!(signals.is_current(first));

    let second = signals.begin_auth();
    assert!(!signals.is_current(first));
    assert!(signals.is_current(second));

    signals.reset();
    assert!(!signals.is_current(second));
}
