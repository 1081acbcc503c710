//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑层，不依赖 DOM 或 web_sys。
//! 定义应用的所有路由及其鉴权/角色属性。

use nexus_shared::Role;
use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 落地页 (默认路由)
    #[default]
    Landing,
    /// 登录页面
    Login,
    /// 注册页面
    Register,
    /// 服务选择（需要认证）
    ServiceSelection,
    /// 患者个人主页（角色门控）
    PatientProfile,
    /// 医生个人主页（角色门控）
    DoctorProfile,
    /// 管理员主页（角色门控）
    AdminProfile,
    /// 患者仪表盘（角色门控）
    PatientDashboard,
    /// 医生仪表盘（角色门控）
    DoctorDashboard,
    /// 预约列表（需要认证）
    Appointments,
    /// 消息列表（需要认证）
    Messages,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        match path {
            "/" => Self::Landing,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/service-selection" => Self::ServiceSelection,
            "/patient/profile" => Self::PatientProfile,
            "/doctor/profile" => Self::DoctorProfile,
            "/admin/profile" => Self::AdminProfile,
            "/patient/nexus-direct" => Self::PatientDashboard,
            "/doctor/nexus-direct" => Self::DoctorDashboard,
            "/appointments" => Self::Appointments,
            "/messages" => Self::Messages,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::ServiceSelection => "/service-selection",
            Self::PatientProfile => "/patient/profile",
            Self::DoctorProfile => "/doctor/profile",
            Self::AdminProfile => "/admin/profile",
            Self::PatientDashboard => "/patient/nexus-direct",
            Self::DoctorDashboard => "/doctor/nexus-direct",
            Self::Appointments => "/appointments",
            Self::Messages => "/messages",
            Self::NotFound => "/404",
        }
    }

    /// **核心守卫逻辑：该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Self::Landing | Self::Login | Self::Register | Self::NotFound
        )
    }

    /// 角色门控路由要求的角色；`None` 表示认证即可进入
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Self::PatientProfile | Self::PatientDashboard => Some(Role::Patient),
            Self::DoctorProfile | Self::DoctorDashboard => Some(Role::Doctor),
            Self::AdminProfile => Some(Role::Admin),
            _ => None,
        }
    }

    /// 已认证用户是否应该离开此路由（如登录/注册页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
