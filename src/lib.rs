#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod capabilities;
pub mod event;
pub mod model;
pub mod routes;
pub mod stats;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::{ApiConfig, CollectionKind, Model, ReportStore, Session};
pub use routes::Route;
pub use stats::{compute_stats, StatsSnapshot};

pub const DESCRIPTION_PREVIEW_LENGTH: usize = 80;
pub const LOGIN_TIMEOUT_MS: u64 = 30_000;
pub const FETCH_TIMEOUT_MS: u64 = 30_000;
pub const UPDATE_STATUS_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Authentication,
    Authorization,
    Validation,
    NotFound,
    Internal,
    Application,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Authentication => "AUTH_ERROR",
            Self::Authorization => "FORBIDDEN",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Internal => "INTERNAL_ERROR",
            Self::Application => "APPLICATION_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Transport-class errors come from the connection or the HTTP status
    /// line; application-class errors come from a well-formed 2xx envelope
    /// that did not carry what it promised.
    #[must_use]
    pub const fn is_transport(self) -> bool {
        !matches!(self, Self::Application)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn application(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Application, message)
    }

    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let kind = match status {
            400 => ErrorKind::Validation,
            401 => ErrorKind::Authentication,
            403 => ErrorKind::Authorization,
            404 => ErrorKind::NotFound,
            408 => ErrorKind::Timeout,
            500..=599 => ErrorKind::Internal,
            _ => ErrorKind::Unknown,
        };

        let message = body
            .and_then(|b| serde_json::from_slice::<ApiErrorResponse>(b).ok())
            .and_then(|e| {
                if e.message.is_empty() {
                    None
                } else {
                    Some(e.message)
                }
            })
            .unwrap_or_else(|| format!("HTTP error: {status}"));

        Self::new(kind, message)
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl ReportId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review status of a report. The wire format is a closed enumeration;
/// unknown values fail decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Solved,
}

impl ReportStatus {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            "SOLVED" => Some(Self::Solved),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Solved => "SOLVED",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Solved => "Solved",
        }
    }

    #[must_use]
    pub const fn is_reviewed(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FishReference {
    pub name: String,
    #[serde(default)]
    pub danger_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportUser {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A user-submitted observation record: geolocation, photo evidence and a
/// review status. Client copies are caches; the backend owns canonical state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub status: ReportStatus,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub photo_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fish_reference: Option<FishReference>,
    #[serde(default)]
    pub user: Option<ReportUser>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub admin_note: Option<String>,
    #[serde(default)]
    pub address_text: Option<String>,
    // The backend still emits the legacy snake_case spelling here.
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Report {
    /// Submitter identity used for distinct-user counting: the populated
    /// user record's id, falling back to the flat `userId` field. Empty
    /// strings count as missing.
    #[must_use]
    pub fn submitter_identity(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.id.as_deref())
            .filter(|id| !id.is_empty())
            .or_else(|| self.user_id.as_deref().filter(|id| !id.is_empty()))
    }

    /// Coordinates usable for map placement: both present, finite and in
    /// range.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.latitude?;
        let lon = self.longitude?;
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some((lat, lon))
    }

    #[must_use]
    pub fn description_preview(&self, max_len: usize) -> String {
        self.description
            .as_ref()
            .map(|d| {
                if d.len() <= max_len {
                    d.clone()
                } else {
                    let mut preview: String = d.chars().take(max_len.saturating_sub(3)).collect();
                    preview.push_str("...");
                    preview
                }
            })
            .unwrap_or_default()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// Redact debug output because this carries a user-provided secret.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The uniform `{success, data}` wrapper the backend uses for authenticated
/// responses.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The login endpoint answers with one of two shapes: `{data: {token}}` or
/// `{token}`. Both are decoded explicitly; anything else fails closed.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginEnvelope {
    #[serde(default)]
    pub data: Option<LoginData>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub token: Option<String>,
}

impl LoginEnvelope {
    /// First non-empty token wins; an empty string is treated as absent.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.token.as_deref())
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.as_deref().filter(|t| !t.is_empty()))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateBody {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
}

/// The authoritative values the backend reports back after a status
/// mutation; these, not the requested values, are written into the cache.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateData {
    pub status: ReportStatus,
    #[serde(default)]
    pub admin_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportListItem {
    pub id: String,
    pub status: ReportStatus,
    pub photo_url: String,
    pub description_preview: String,
    pub fish_name: Option<String>,
    pub danger_level: Option<String>,
    pub submitted_by: Option<String>,
    pub address_text: Option<String>,
    pub admin_note: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPin {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub is_authenticated: bool,
    pub route: Route,
    pub logging_in: bool,
    pub login_error: Option<String>,
    pub reports: Vec<ReportListItem>,
    pub loading_reports: bool,
    pub reports_error: Option<String>,
    pub map_pins: Vec<ReportPin>,
    pub loading_map: bool,
    pub map_error: Option<String>,
    pub stats: Option<StatsSnapshot>,
    pub loading_dashboard: bool,
    pub dashboard_error: Option<String>,
    pub updating_status: bool,
    pub update_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_json(extra: &str) -> String {
        format!(
            r#"{{"id": "r1", "status": "PENDING", "photoUrl": "https://cdn.example.com/p.jpg"{extra}}}"#
        )
    }

    #[test]
    fn report_decodes_minimal_payload() {
        let report: Report = serde_json::from_str(&report_json("")).unwrap();
        assert_eq!(report.id, ReportId::new("r1"));
        assert_eq!(report.status, ReportStatus::Pending);
        assert!(report.latitude.is_none());
        assert!(report.submitter_identity().is_none());
    }

    #[test]
    fn report_accepts_legacy_created_at_spelling() {
        let report: Report =
            serde_json::from_str(&report_json(r#", "created_at": "2024-05-01T10:00:00Z""#))
                .unwrap();
        assert_eq!(report.created_at.as_deref(), Some("2024-05-01T10:00:00Z"));

        let report: Report =
            serde_json::from_str(&report_json(r#", "createdAt": "2024-05-02T10:00:00Z""#))
                .unwrap();
        assert_eq!(report.created_at.as_deref(), Some("2024-05-02T10:00:00Z"));
    }

    #[test]
    fn report_rejects_unknown_status() {
        let result = serde_json::from_str::<Report>(
            r#"{"id": "r1", "status": "ARCHIVED", "photoUrl": "x"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(ReportStatus::parse("solved"), Some(ReportStatus::Solved));
        assert_eq!(ReportStatus::parse("PENDING"), Some(ReportStatus::Pending));
        assert_eq!(ReportStatus::parse("archived"), None);
    }

    #[test]
    fn submitter_identity_prefers_user_record_id() {
        let report: Report = serde_json::from_str(&report_json(
            r#", "user": {"_id": "u-9", "name": "Ayu"}, "userId": "u-1""#,
        ))
        .unwrap();
        assert_eq!(report.submitter_identity(), Some("u-9"));
    }

    #[test]
    fn submitter_identity_falls_back_past_empty_id() {
        let report: Report = serde_json::from_str(&report_json(
            r#", "user": {"_id": "", "name": "Ayu"}, "userId": "u-1""#,
        ))
        .unwrap();
        assert_eq!(report.submitter_identity(), Some("u-1"));
    }

    #[test]
    fn coordinates_require_valid_range() {
        let mut report: Report = serde_json::from_str(&report_json("")).unwrap();
        assert!(report.coordinates().is_none());

        report.latitude = Some(-6.2);
        report.longitude = Some(106.8);
        assert_eq!(report.coordinates(), Some((-6.2, 106.8)));

        report.latitude = Some(91.0);
        assert!(report.coordinates().is_none());

        report.latitude = Some(f64::NAN);
        assert!(report.coordinates().is_none());
    }

    #[test]
    fn description_preview_truncates() {
        let mut report: Report = serde_json::from_str(&report_json("")).unwrap();
        assert_eq!(report.description_preview(10), "");

        report.description = Some("short".into());
        assert_eq!(report.description_preview(10), "short");

        report.description = Some("a".repeat(20));
        let preview = report.description_preview(10);
        assert_eq!(preview, format!("{}...", "a".repeat(7)));
    }

    #[test]
    fn login_envelope_accepts_nested_shape() {
        let envelope: LoginEnvelope =
            serde_json::from_str(r#"{"success": true, "data": {"token": "jwt-1"}}"#).unwrap();
        assert_eq!(envelope.token(), Some("jwt-1"));
    }

    #[test]
    fn login_envelope_accepts_flat_shape() {
        let envelope: LoginEnvelope = serde_json::from_str(r#"{"token": "jwt-2"}"#).unwrap();
        assert_eq!(envelope.token(), Some("jwt-2"));
    }

    #[test]
    fn login_envelope_first_non_empty_token_wins() {
        let envelope: LoginEnvelope =
            serde_json::from_str(r#"{"data": {"token": ""}, "token": "jwt-3"}"#).unwrap();
        assert_eq!(envelope.token(), Some("jwt-3"));
    }

    #[test]
    fn login_envelope_fails_closed_without_token() {
        let envelope: LoginEnvelope =
            serde_json::from_str(r#"{"success": true, "data": {}}"#).unwrap();
        assert_eq!(envelope.token(), None);

        let envelope: LoginEnvelope = serde_json::from_str(r#"{"token": ""}"#).unwrap();
        assert_eq!(envelope.token(), None);
    }

    #[test]
    fn from_http_status_uses_backend_message() {
        let error = AppError::from_http_status(401, Some(br#"{"message": "Bad credentials"}"#));
        assert_eq!(error.kind, ErrorKind::Authentication);
        assert_eq!(error.message, "Bad credentials");
        assert!(error.kind.is_transport());
    }

    #[test]
    fn from_http_status_falls_back_to_generic_message() {
        let error = AppError::from_http_status(502, Some(b"<html>bad gateway</html>"));
        assert_eq!(error.kind, ErrorKind::Internal);
        assert_eq!(error.message, "HTTP error: 502");
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let debug = format!("{:?}", Credentials::new("a@b.c", "hunter2"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn status_update_body_omits_absent_note() {
        let body = StatusUpdateBody {
            status: ReportStatus::Approved,
            admin_note: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"status":"APPROVED"}"#);

        let body = StatusUpdateBody {
            status: ReportStatus::Rejected,
            admin_note: Some("blurry photo".into()),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""adminNote":"blurry photo""#));
    }
}
