use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::routes::Route;
use crate::stats::StatsSnapshot;
use crate::{AppError, Report, ReportId, ReportStatus};

pub const TOKEN_STORAGE_KEY: &str = "token";
pub const BASE_PATH_STORAGE_KEY: &str = "api_base_path";
pub const DEFAULT_BASE_PATH: &str = "/api";

/// The single API configuration value, selected once at startup. Endpoint
/// paths hang off it so no second base-path constant can drift out of sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/auth/login", self.base_path)
    }

    #[must_use]
    pub fn admin_reports_url(&self) -> String {
        format!("{}/admin/reports", self.base_path)
    }

    #[must_use]
    pub fn map_reports_url(&self) -> String {
        format!("{}/admin/map", self.base_path)
    }

    #[must_use]
    pub fn all_reports_url(&self) -> String {
        format!("{}/reports", self.base_path)
    }

    #[must_use]
    pub fn report_status_url(&self, id: &ReportId) -> String {
        format!("{}/admin/reports/{}/status", self.base_path, id)
    }
}

/// Owns the bearer token. The token is a runtime secret: never serialized,
/// redacted in debug output, persisted only through the key-value capability.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(SecretString::new(token.into()));
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    /// Read fresh at every call site that builds a request; never memoized.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret().as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    Admin,
    Map,
    Dashboard,
}

/// Normalized report cache: one entity per id, with each fetch endpoint's
/// collection kept as an ordered list of id references. A status mutation
/// writes the entity once and every collection observes it — consistency is
/// structural, not a per-list chore.
#[derive(Debug, Default)]
pub struct ReportStore {
    entities: HashMap<ReportId, Report>,
    admin: Vec<ReportId>,
    map: Vec<ReportId>,
    dashboard: Vec<ReportId>,
}

impl ReportStore {
    fn ids(&self, kind: CollectionKind) -> &[ReportId] {
        match kind {
            CollectionKind::Admin => &self.admin,
            CollectionKind::Map => &self.map,
            CollectionKind::Dashboard => &self.dashboard,
        }
    }

    fn ids_mut(&mut self, kind: CollectionKind) -> &mut Vec<ReportId> {
        match kind {
            CollectionKind::Admin => &mut self.admin,
            CollectionKind::Map => &mut self.map,
            CollectionKind::Dashboard => &mut self.dashboard,
        }
    }

    /// Wholesale replace of one collection: the new response's membership
    /// and order win, entities are upserted, and entities no longer
    /// referenced by any collection are dropped. Other collections keep
    /// their membership untouched.
    pub fn replace(&mut self, kind: CollectionKind, reports: Vec<Report>) {
        let ids: Vec<ReportId> = reports.iter().map(|r| r.id.clone()).collect();
        for report in reports {
            self.entities.insert(report.id.clone(), report);
        }
        *self.ids_mut(kind) = ids;
        self.drop_unreferenced();
    }

    fn drop_unreferenced(&mut self) {
        let referenced: HashSet<ReportId> = self
            .admin
            .iter()
            .chain(self.map.iter())
            .chain(self.dashboard.iter())
            .cloned()
            .collect();
        self.entities.retain(|id, _| referenced.contains(id));
    }

    /// Writes the backend-returned status and note into the cached entity.
    /// Returns false when no collection holds the id (nothing to update).
    pub fn apply_status_update(
        &mut self,
        id: &ReportId,
        status: ReportStatus,
        admin_note: Option<String>,
    ) -> bool {
        match self.entities.get_mut(id) {
            Some(report) => {
                report.status = status;
                report.admin_note = admin_note;
                true
            }
            None => false,
        }
    }

    pub fn collection(&self, kind: CollectionKind) -> impl Iterator<Item = &Report> {
        self.ids(kind).iter().filter_map(|id| self.entities.get(id))
    }

    #[must_use]
    pub fn len(&self, kind: CollectionKind) -> usize {
        self.ids(kind).len()
    }

    #[must_use]
    pub fn is_empty(&self, kind: CollectionKind) -> bool {
        self.ids(kind).is_empty()
    }

    #[must_use]
    pub fn contains(&self, kind: CollectionKind, id: &ReportId) -> bool {
        self.ids(kind).contains(id)
    }

    #[must_use]
    pub fn get(&self, id: &ReportId) -> Option<&Report> {
        self.entities.get(id)
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: ApiConfig,
    pub session: Session,
    pub store: ReportStore,
    pub stats: Option<StatsSnapshot>,
    pub route: Route,

    pub logging_in: bool,
    pub login_error: Option<AppError>,

    pub loading_reports: bool,
    pub reports_error: Option<AppError>,

    pub loading_map: bool,
    pub map_error: Option<AppError>,

    pub loading_dashboard: bool,
    pub dashboard_error: Option<AppError>,

    pub updating_status: bool,
    pub update_error: Option<AppError>,
}

impl Model {
    pub fn clear_errors(&mut self) {
        self.login_error = None;
        self.reports_error = None;
        self.map_error = None;
        self.dashboard_error = None;
        self.update_error = None;
    }
}
