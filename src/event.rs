use crate::capabilities::{HttpResult, KvResult};
use crate::routes::Route;
use crate::{Credentials, ReportId, ReportStatus};

#[derive(Debug, Clone)]
pub enum Event {
    AppStarted,
    SessionRestored {
        result: Box<KvResult>,
    },
    ConfigRestored {
        result: Box<KvResult>,
    },

    NavigationRequested {
        to: Route,
    },

    LoginRequested {
        credentials: Credentials,
    },
    LoginResponse(Box<HttpResult>),
    TokenPersisted {
        result: Box<KvResult>,
    },
    LogoutRequested,
    TokenRemoved {
        result: Box<KvResult>,
    },

    FetchReportsRequested,
    ReportsResponse(Box<HttpResult>),
    FetchMapReportsRequested,
    MapReportsResponse(Box<HttpResult>),
    FetchDashboardRequested,
    DashboardResponse(Box<HttpResult>),

    UpdateStatusRequested {
        id: ReportId,
        status: ReportStatus,
        admin_note: Option<String>,
    },
    UpdateStatusResponse {
        id: ReportId,
        result: Box<HttpResult>,
    },

    DismissErrors,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::SessionRestored { .. } => "session_restored",
            Self::ConfigRestored { .. } => "config_restored",
            Self::NavigationRequested { .. } => "navigation_requested",
            Self::LoginRequested { .. } => "login_requested",
            Self::LoginResponse(_) => "login_response",
            Self::TokenPersisted { .. } => "token_persisted",
            Self::LogoutRequested => "logout_requested",
            Self::TokenRemoved { .. } => "token_removed",
            Self::FetchReportsRequested => "fetch_reports_requested",
            Self::ReportsResponse(_) => "reports_response",
            Self::FetchMapReportsRequested => "fetch_map_reports_requested",
            Self::MapReportsResponse(_) => "map_reports_response",
            Self::FetchDashboardRequested => "fetch_dashboard_requested",
            Self::DashboardResponse(_) => "dashboard_response",
            Self::UpdateStatusRequested { .. } => "update_status_requested",
            Self::UpdateStatusResponse { .. } => "update_status_response",
            Self::DismissErrors => "dismiss_errors",
        }
    }
}
