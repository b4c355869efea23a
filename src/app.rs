use crate::capabilities::{
    Capabilities, HttpError, HttpRequest, HttpResult, KeyNamespace, KvKey, KvOutput, KvResult,
};
use crate::event::Event;
use crate::model::{CollectionKind, Model, BASE_PATH_STORAGE_KEY, TOKEN_STORAGE_KEY};
use crate::routes::{resolve_navigation, Route};
use crate::stats::compute_stats;
use crate::{
    AppError, Envelope, ErrorKind, LoginEnvelope, Report, ReportId, ReportListItem, ReportPin,
    ReportStatus, StatusUpdateBody, StatusUpdateData, ViewModel, DESCRIPTION_PREVIEW_LENGTH,
    FETCH_TIMEOUT_MS, LOGIN_TIMEOUT_MS, UPDATE_STATUS_TIMEOUT_MS,
};

const MISSING_TOKEN_MESSAGE: &str = "Invalid credentials or missing token";
const REPORTS_FAILED_MESSAGE: &str = "Failed to load reports";
const MAP_FAILED_MESSAGE: &str = "Failed to load map data";
const DASHBOARD_FAILED_MESSAGE: &str = "Failed to load data";
const UPDATE_FAILED_MESSAGE: &str = "Failed to update status";

#[derive(Default)]
pub struct App;

impl App {
    fn token_key() -> KvKey {
        KvKey::new(KeyNamespace::Session, TOKEN_STORAGE_KEY)
    }

    fn base_path_key() -> KvKey {
        KvKey::new(KeyNamespace::Settings, BASE_PATH_STORAGE_KEY)
    }

    fn transport_error(error: &HttpError) -> AppError {
        match error {
            HttpError::Network { message } => AppError::new(ErrorKind::Network, message.clone()),
            HttpError::Timeout => AppError::new(ErrorKind::Timeout, "Request timed out"),
            other => AppError::new(ErrorKind::Unknown, other.to_string()),
        }
    }

    /// Decodes a `{success, data: [...]}` listing. A 2xx envelope that is
    /// not exactly that shape fails closed with `failure_message`; non-2xx
    /// and connection failures keep their transport classification.
    fn decode_report_list(
        result: HttpResult,
        failure_message: &str,
    ) -> Result<Vec<Report>, AppError> {
        match result {
            Ok(response) if response.is_success() => {
                let envelope: Envelope<Vec<Report>> = response
                    .json()
                    .map_err(|_| AppError::application(failure_message))?;
                if !envelope.success {
                    return Err(AppError::application(failure_message));
                }
                envelope
                    .data
                    .ok_or_else(|| AppError::application(failure_message))
            }
            Ok(response) => Err(AppError::from_http_status(
                response.status,
                Some(&response.body),
            )),
            Err(error) => Err(Self::transport_error(&error)),
        }
    }

    fn decode_login_token(result: HttpResult) -> Result<String, AppError> {
        match result {
            Ok(response) if response.is_success() => {
                let envelope: LoginEnvelope = response
                    .json()
                    .map_err(|_| AppError::application(MISSING_TOKEN_MESSAGE))?;
                envelope
                    .token()
                    .map(str::to_owned)
                    .ok_or_else(|| AppError::application(MISSING_TOKEN_MESSAGE))
            }
            Ok(response) => Err(AppError::from_http_status(
                response.status,
                Some(&response.body),
            )),
            Err(error) => Err(Self::transport_error(&error)),
        }
    }

    fn decode_status_update(result: HttpResult) -> Result<StatusUpdateData, AppError> {
        match result {
            Ok(response) if response.is_success() => {
                let envelope: Envelope<StatusUpdateData> = response
                    .json()
                    .map_err(|_| AppError::application(UPDATE_FAILED_MESSAGE))?;
                if !envelope.success {
                    return Err(AppError::application(UPDATE_FAILED_MESSAGE));
                }
                envelope
                    .data
                    .ok_or_else(|| AppError::application(UPDATE_FAILED_MESSAGE))
            }
            Ok(response) => Err(AppError::from_http_status(
                response.status,
                Some(&response.body),
            )),
            Err(error) => Err(Self::transport_error(&error)),
        }
    }

    fn handle_session_restored(result: KvResult, model: &mut Model) {
        match result {
            Ok(KvOutput::Value(Some(bytes))) => match String::from_utf8(bytes) {
                Ok(token) if !token.is_empty() => {
                    model.session.set_token(token);
                    tracing::info!("session restored from storage");
                }
                Ok(_) => {}
                Err(error) => tracing::warn!(%error, "stored token is not valid UTF-8"),
            },
            Ok(KvOutput::Value(None)) => {}
            Ok(_) => tracing::warn!("unexpected storage output while restoring session"),
            Err(error) => tracing::warn!(%error, "failed to read stored session"),
        }
    }

    fn handle_config_restored(result: KvResult, model: &mut Model) {
        if let Ok(KvOutput::Value(Some(bytes))) = result {
            match String::from_utf8(bytes) {
                Ok(base_path) if !base_path.is_empty() => {
                    tracing::info!(%base_path, "api base path configured from storage");
                    model.config.base_path = base_path;
                }
                _ => tracing::warn!("ignoring invalid stored base path"),
            }
        }
    }

    fn handle_login_response(result: HttpResult, model: &mut Model, caps: &Capabilities) {
        model.logging_in = false;
        match Self::decode_login_token(result) {
            Ok(token) => {
                model.session.set_token(token.clone());
                caps.kv.set(Self::token_key(), token.into_bytes(), |result| {
                    Event::TokenPersisted {
                        result: Box::new(result),
                    }
                });
                model.route = Route::Dashboard;
                caps.navigate.navigate(Route::Dashboard);
                tracing::info!("login succeeded");
            }
            Err(error) => {
                tracing::warn!(%error, "login failed");
                model.login_error = Some(error);
            }
        }
    }

    fn request_reports(model: &mut Model, caps: &Capabilities) {
        let request = HttpRequest::get(model.config.admin_reports_url())
            .with_bearer(model.session.bearer_token())
            .with_timeout_ms(FETCH_TIMEOUT_MS);
        model.loading_reports = true;
        model.reports_error = None;
        caps.http
            .send(request, |result| Event::ReportsResponse(Box::new(result)));
    }

    fn handle_reports_response(result: HttpResult, model: &mut Model) {
        model.loading_reports = false;
        match Self::decode_report_list(result, REPORTS_FAILED_MESSAGE) {
            Ok(reports) => {
                tracing::debug!(count = reports.len(), "admin reports refreshed");
                model.store.replace(CollectionKind::Admin, reports);
            }
            Err(error) => {
                tracing::warn!(%error, "failed to refresh admin reports");
                model.reports_error = Some(error);
            }
        }
    }

    fn request_map_reports(model: &mut Model, caps: &Capabilities) {
        let request = HttpRequest::get(model.config.map_reports_url())
            .with_bearer(model.session.bearer_token())
            .with_timeout_ms(FETCH_TIMEOUT_MS);
        model.loading_map = true;
        model.map_error = None;
        caps.http
            .send(request, |result| Event::MapReportsResponse(Box::new(result)));
    }

    fn handle_map_reports_response(result: HttpResult, model: &mut Model) {
        model.loading_map = false;
        match Self::decode_report_list(result, MAP_FAILED_MESSAGE) {
            Ok(reports) => {
                tracing::debug!(count = reports.len(), "map reports refreshed");
                model.store.replace(CollectionKind::Map, reports);
            }
            Err(error) => {
                tracing::warn!(%error, "failed to refresh map reports");
                model.map_error = Some(error);
            }
        }
    }

    fn request_dashboard(model: &mut Model, caps: &Capabilities) {
        let request = HttpRequest::get(model.config.all_reports_url())
            .with_bearer(model.session.bearer_token())
            .with_timeout_ms(FETCH_TIMEOUT_MS);
        model.loading_dashboard = true;
        model.dashboard_error = None;
        caps.http
            .send(request, |result| Event::DashboardResponse(Box::new(result)));
    }

    fn handle_dashboard_response(result: HttpResult, model: &mut Model) {
        model.loading_dashboard = false;
        match Self::decode_report_list(result, DASHBOARD_FAILED_MESSAGE) {
            Ok(reports) => {
                tracing::debug!(count = reports.len(), "dashboard reports refreshed");
                model.store.replace(CollectionKind::Dashboard, reports);
                // Stats follow the fetch, not individual mutations.
                model.stats = Some(compute_stats(
                    model.store.collection(CollectionKind::Dashboard),
                ));
            }
            Err(error) => {
                tracing::warn!(%error, "failed to refresh dashboard");
                model.dashboard_error = Some(error);
            }
        }
    }

    fn request_status_update(
        id: ReportId,
        status: ReportStatus,
        admin_note: Option<String>,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let body = StatusUpdateBody { status, admin_note };
        let request = HttpRequest::put(model.config.report_status_url(&id))
            .with_bearer(model.session.bearer_token())
            .with_timeout_ms(UPDATE_STATUS_TIMEOUT_MS)
            .with_json(&body);

        match request {
            Ok(request) => {
                model.updating_status = true;
                model.update_error = None;
                caps.http.send(request, move |result| {
                    Event::UpdateStatusResponse {
                        id,
                        result: Box::new(result),
                    }
                });
            }
            Err(error) => {
                model.update_error = Some(AppError::application(error.to_string()));
            }
        }
    }

    fn handle_update_status_response(id: &ReportId, result: HttpResult, model: &mut Model) {
        model.updating_status = false;
        match Self::decode_status_update(result) {
            Ok(data) => {
                let applied = model
                    .store
                    .apply_status_update(id, data.status, data.admin_note);
                if applied {
                    tracing::debug!(report = %id, status = data.status.as_str(), "report status updated");
                } else {
                    tracing::debug!(report = %id, "updated report not held in any collection");
                }
            }
            Err(error) => {
                tracing::warn!(report = %id, %error, "status update failed");
                model.update_error = Some(error);
            }
        }
    }

    fn build_list_items(model: &Model) -> Vec<ReportListItem> {
        model
            .store
            .collection(CollectionKind::Admin)
            .map(|r| ReportListItem {
                id: r.id.to_string(),
                status: r.status,
                photo_url: r.photo_url.clone(),
                description_preview: r.description_preview(DESCRIPTION_PREVIEW_LENGTH),
                fish_name: r.fish_reference.as_ref().map(|f| f.name.clone()),
                danger_level: r.fish_reference.as_ref().and_then(|f| f.danger_level.clone()),
                submitted_by: r.user.as_ref().and_then(|u| u.name.clone()),
                address_text: r.address_text.clone(),
                admin_note: r.admin_note.clone(),
                created_at: r.created_at.clone(),
            })
            .collect()
    }

    fn build_map_pins(model: &Model) -> Vec<ReportPin> {
        model
            .store
            .collection(CollectionKind::Map)
            .filter_map(|r| {
                r.coordinates().map(|(lat, lon)| ReportPin {
                    id: r.id.to_string(),
                    lat,
                    lon,
                    status: r.status,
                })
            })
            .collect()
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        tracing::debug!(event = event.name(), "handling event");

        match event {
            Event::AppStarted => {
                caps.kv.get(Self::base_path_key(), |result| Event::ConfigRestored {
                    result: Box::new(result),
                });
                caps.kv.get(Self::token_key(), |result| Event::SessionRestored {
                    result: Box::new(result),
                });
            }
            Event::SessionRestored { result } => Self::handle_session_restored(*result, model),
            Event::ConfigRestored { result } => Self::handle_config_restored(*result, model),

            Event::NavigationRequested { to } => {
                let destination = resolve_navigation(to, model.session.is_authenticated());
                if destination != to {
                    tracing::debug!(
                        requested = to.path(),
                        resolved = destination.path(),
                        "navigation redirected"
                    );
                }
                model.route = destination;
                caps.navigate.navigate(destination);
            }

            Event::LoginRequested { credentials } => {
                let request = HttpRequest::post(model.config.login_url())
                    .with_timeout_ms(LOGIN_TIMEOUT_MS)
                    .with_json(&credentials);
                match request {
                    Ok(request) => {
                        model.logging_in = true;
                        model.login_error = None;
                        caps.http
                            .send(request, |result| Event::LoginResponse(Box::new(result)));
                    }
                    Err(error) => {
                        model.login_error = Some(AppError::application(error.to_string()));
                    }
                }
            }
            Event::LoginResponse(result) => Self::handle_login_response(*result, model, caps),
            Event::TokenPersisted { result } => {
                if let Err(error) = *result {
                    tracing::warn!(%error, "failed to persist session token");
                }
            }

            Event::LogoutRequested => {
                model.session.clear();
                caps.kv.delete(Self::token_key(), |result| Event::TokenRemoved {
                    result: Box::new(result),
                });
                model.route = Route::Login;
                caps.navigate.navigate(Route::Login);
                tracing::info!("logged out");
            }
            Event::TokenRemoved { result } => {
                // Logout has no failure mode; a stuck storage entry is only logged.
                if let Err(error) = *result {
                    tracing::warn!(%error, "failed to remove stored token");
                }
            }

            Event::FetchReportsRequested => Self::request_reports(model, caps),
            Event::ReportsResponse(result) => Self::handle_reports_response(*result, model),
            Event::FetchMapReportsRequested => Self::request_map_reports(model, caps),
            Event::MapReportsResponse(result) => {
                Self::handle_map_reports_response(*result, model);
            }
            Event::FetchDashboardRequested => Self::request_dashboard(model, caps),
            Event::DashboardResponse(result) => Self::handle_dashboard_response(*result, model),

            Event::UpdateStatusRequested {
                id,
                status,
                admin_note,
            } => Self::request_status_update(id, status, admin_note, model, caps),
            Event::UpdateStatusResponse { id, result } => {
                Self::handle_update_status_response(&id, *result, model);
            }

            Event::DismissErrors => model.clear_errors(),
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel {
            is_authenticated: model.session.is_authenticated(),
            route: model.route,
            logging_in: model.logging_in,
            login_error: model.login_error.as_ref().map(|e| e.message.clone()),
            reports: Self::build_list_items(model),
            loading_reports: model.loading_reports,
            reports_error: model.reports_error.as_ref().map(|e| e.message.clone()),
            map_pins: Self::build_map_pins(model),
            loading_map: model.loading_map,
            map_error: model.map_error.as_ref().map(|e| e.message.clone()),
            stats: model.stats,
            loading_dashboard: model.loading_dashboard,
            dashboard_error: model.dashboard_error.as_ref().map(|e| e.message.clone()),
            updating_status: model.updating_status,
            update_error: model.update_error.as_ref().map(|e| e.message.clone()),
        }
    }
}
