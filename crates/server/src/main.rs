// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod collaborators;
mod config;
mod geo_check;
mod live;
mod session;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use collaborators::{
    CollaboratorError, DeclarationBackend, DeclarationDetail, HttpDeclarationBackend,
};
use config::{
    DEFAULT_GEOMETRY_DELAY_MS, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_GEO_WAIT_MS,
    DEFAULT_SATELLITE_DELAY_MS, GeoTimings, SessionSettings,
};
use eudr_declare::Wizard;
use eudr_declare_api::{
    ApiError, CommandRequest, CreateSessionResponse, GeoFileRequest, SubmitResponse, WizardView,
    build_wizard_view, translate_domain_error,
};
use eudr_declare_domain::{
    Counterparty, CounterpartyRole, DEFAULT_MAX_UPLOAD_BYTES, SourceDeclaration,
    TypeBasedGeoPolicy, UploadLimits,
};
use live::LiveEventBroadcaster;
use serde::{Deserialize, Serialize};
use session::{SessionError, SessionHandle, SessionRegistry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// EUDR Declare Server - hosts declaration wizard sessions over HTTP
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Base URL of the declaration persistence service
    #[arg(long, default_value = "http://127.0.0.1:4000")]
    persistence_url: String,

    /// Settle delay of the geometry check, in milliseconds
    #[arg(long, default_value_t = DEFAULT_GEOMETRY_DELAY_MS)]
    geometry_delay_ms: u64,

    /// Settle delay of the satellite check, in milliseconds
    #[arg(long, default_value_t = DEFAULT_SATELLITE_DELAY_MS)]
    satellite_delay_ms: u64,

    /// Longest a single geo check may take before it fails as timed out, in milliseconds
    #[arg(long, default_value_t = DEFAULT_MAX_GEO_WAIT_MS)]
    max_geo_wait_ms: u64,

    /// Largest accepted upload, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: u64,

    /// Seconds a session may go without requests before it is closed
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    idle_timeout_secs: u64,
}

impl Args {
    const fn settings(&self) -> SessionSettings {
        SessionSettings {
            timings: GeoTimings::from_millis(
                self.geometry_delay_ms,
                self.satellite_delay_ms,
                self.max_geo_wait_ms,
            ),
            limits: UploadLimits {
                max_bytes: self.max_upload_bytes,
            },
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
        }
    }
}

/// Application state shared across handlers.
struct AppState<B: DeclarationBackend> {
    /// Open wizard sessions.
    sessions: SessionRegistry<B>,
}

impl<B: DeclarationBackend> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
        }
    }
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
    /// The step whose gate refused, for step rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    step_index: Option<u8>,
    /// Machine-readable refusal reason, for step rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    reason_code: Option<String>,
    /// True when resending the same request may succeed.
    retryable: bool,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    /// Gate refusal details, if any.
    rejection: Option<(u8, String)>,
    /// Whether the caller may retry.
    retryable: bool,
}

impl HttpError {
    const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            rejection: None,
            retryable: false,
        }
    }

    fn session_not_found(id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Session not found: {id}"))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (step_index, reason_code) = self
            .rejection
            .map_or((None, None), |(step, reason)| (Some(step), Some(reason)));
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            step_index,
            reason_code,
            retryable: self.retryable,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::DomainRuleViolation { .. } => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ApiError::InvalidInput { .. } => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::StepRejected {
                step_index,
                reason_code,
                message,
            } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message,
                rejection: Some((step_index, reason_code)),
                retryable: false,
            },
            ApiError::Conflict { .. } => Self::new(StatusCode::CONFLICT, err.to_string()),
            ApiError::ResourceNotFound { .. } => Self::new(StatusCode::NOT_FOUND, err.to_string()),
        }
    }
}

impl From<CollaboratorError> for HttpError {
    fn from(err: CollaboratorError) -> Self {
        if err.is_not_found() {
            return Self::new(StatusCode::NOT_FOUND, err.to_string());
        }
        error!(error = %err, "Persistence service error");
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: format!("Persistence service error: {err}"),
            rejection: None,
            retryable: err.is_retryable(),
        }
    }
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Api(api_err) => Self::from(api_err),
            SessionError::Submission(source) => Self {
                status: StatusCode::BAD_GATEWAY,
                message: format!("Submission failed, the draft was kept: {source}"),
                rejection: None,
                retryable: source.is_retryable(),
            },
            SessionError::Closed(id) => Self::session_not_found(&id),
        }
    }
}

async fn find_session<B: DeclarationBackend>(
    app_state: &AppState<B>,
    id: &str,
) -> Result<SessionHandle, HttpError> {
    app_state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| HttpError::session_not_found(id))
}

fn view(handle: &SessionHandle, wizard: &Wizard) -> Json<WizardView> {
    Json(build_wizard_view(handle.id(), wizard))
}

/// Handler for POST `/sessions` endpoint.
///
/// Opens a new wizard session on step 1.
async fn handle_create_session<B: DeclarationBackend>(
    AxumState(app_state): AxumState<AppState<B>>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let handle: SessionHandle = app_state.sessions.create().await;
    info!(session_id = %handle.id(), "Created session");
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: handle.id().to_string(),
        }),
    )
}

/// Handler for GET `/sessions/{id}` endpoint.
async fn handle_get_session<B: DeclarationBackend>(
    AxumState(app_state): AxumState<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, HttpError> {
    let handle: SessionHandle = find_session(&app_state, &id).await?;
    let wizard: Wizard = handle.snapshot().await?;
    Ok(view(&handle, &wizard))
}

/// Handler for DELETE `/sessions/{id}` endpoint.
///
/// Closes the session, discarding its draft.
async fn handle_close_session<B: DeclarationBackend>(
    AxumState(app_state): AxumState<AppState<B>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    if app_state.sessions.close(&id).await {
        info!(session_id = %id, "Closed session");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::session_not_found(&id))
    }
}

/// Handler for POST `/sessions/{id}/commands` endpoint.
///
/// Applies one draft edit.
async fn handle_command<B: DeclarationBackend>(
    AxumState(app_state): AxumState<AppState<B>>,
    Path(id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<WizardView>, HttpError> {
    let handle: SessionHandle = find_session(&app_state, &id).await?;
    let wizard: Wizard = handle.edit(req).await?;
    Ok(view(&handle, &wizard))
}

/// Handler for POST `/sessions/{id}/geo-file` endpoint.
///
/// Selects the geospatial file and starts the geo checks.
async fn handle_select_geo_file<B: DeclarationBackend>(
    AxumState(app_state): AxumState<AppState<B>>,
    Path(id): Path<String>,
    Json(req): Json<GeoFileRequest>,
) -> Result<Json<WizardView>, HttpError> {
    info!(session_id = %id, file_name = %req.file.name, "Handling geo file selection");
    let handle: SessionHandle = find_session(&app_state, &id).await?;
    let wizard: Wizard = handle.select_geo_file(req).await?;
    Ok(view(&handle, &wizard))
}

/// Handler for POST `/sessions/{id}/advance` endpoint.
async fn handle_advance<B: DeclarationBackend>(
    AxumState(app_state): AxumState<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, HttpError> {
    let handle: SessionHandle = find_session(&app_state, &id).await?;
    let wizard: Wizard = handle.advance().await?;
    Ok(view(&handle, &wizard))
}

/// Handler for POST `/sessions/{id}/retreat` endpoint.
async fn handle_retreat<B: DeclarationBackend>(
    AxumState(app_state): AxumState<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, HttpError> {
    let handle: SessionHandle = find_session(&app_state, &id).await?;
    let wizard: Wizard = handle.retreat().await?;
    Ok(view(&handle, &wizard))
}

/// Handler for POST `/sessions/{id}/submit` endpoint.
///
/// Submits the declaration. On success the session starts over on step 1;
/// on failure the draft is kept so the caller can retry.
async fn handle_submit<B: DeclarationBackend>(
    AxumState(app_state): AxumState<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<SubmitResponse>, HttpError> {
    info!(session_id = %id, "Handling submit request");
    let handle: SessionHandle = find_session(&app_state, &id).await?;
    let response: SubmitResponse = handle.submit().await?;
    Ok(Json(response))
}

/// Handler for GET `/sessions/{id}/live` endpoint.
///
/// Upgrades to a WebSocket streaming the session's live events.
async fn handle_live<B: DeclarationBackend>(
    ws: WebSocketUpgrade,
    AxumState(app_state): AxumState<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Response, HttpError> {
    let handle: SessionHandle = find_session(&app_state, &id).await?;
    Ok(live::upgrade(
        ws,
        handle.id().to_string(),
        app_state.sessions.live().clone(),
    ))
}

/// Handler for GET `/source-declarations` endpoint.
///
/// Lists approved inbound declarations an outbound one may be derived from.
async fn handle_list_source_declarations<B: DeclarationBackend>(
    AxumState(app_state): AxumState<AppState<B>>,
) -> Result<Json<Vec<SourceDeclaration>>, HttpError> {
    let sources: Vec<SourceDeclaration> =
        app_state.sessions.backend().list_source_candidates().await?;
    Ok(Json(sources))
}

/// Handler for GET `/counterparties/{role}` endpoint.
async fn handle_list_counterparties<B: DeclarationBackend>(
    AxumState(app_state): AxumState<AppState<B>>,
    Path(role): Path<String>,
) -> Result<Json<Vec<Counterparty>>, HttpError> {
    let role: CounterpartyRole = role
        .parse()
        .map_err(|err| HttpError::from(translate_domain_error(err)))?;
    let counterparties: Vec<Counterparty> =
        app_state.sessions.backend().list_counterparties(role).await?;
    Ok(Json(counterparties))
}

/// Handler for GET `/declarations/{id}` endpoint.
///
/// Fetches a stored declaration, used to seed items when editing or copying.
async fn handle_get_declaration<B: DeclarationBackend>(
    AxumState(app_state): AxumState<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<DeclarationDetail>, HttpError> {
    let detail: DeclarationDetail = app_state.sessions.backend().get_declaration(&id).await?;
    Ok(Json(detail))
}

fn build_router<B: DeclarationBackend>(app_state: AppState<B>) -> Router {
    Router::new()
        .route("/sessions", post(handle_create_session::<B>))
        .route(
            "/sessions/{id}",
            get(handle_get_session::<B>).delete(handle_close_session::<B>),
        )
        .route("/sessions/{id}/commands", post(handle_command::<B>))
        .route("/sessions/{id}/geo-file", post(handle_select_geo_file::<B>))
        .route("/sessions/{id}/advance", post(handle_advance::<B>))
        .route("/sessions/{id}/retreat", post(handle_retreat::<B>))
        .route("/sessions/{id}/submit", post(handle_submit::<B>))
        .route("/sessions/{id}/live", get(handle_live::<B>))
        .route(
            "/source-declarations",
            get(handle_list_source_declarations::<B>),
        )
        .route(
            "/counterparties/{role}",
            get(handle_list_counterparties::<B>),
        )
        .route("/declarations/{id}", get(handle_get_declaration::<B>))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing EUDR Declare Server");

    let settings: SessionSettings = args.settings();
    info!(
        persistence_url = %args.persistence_url,
        geometry_delay_ms = args.geometry_delay_ms,
        satellite_delay_ms = args.satellite_delay_ms,
        max_geo_wait_ms = args.max_geo_wait_ms,
        max_upload_bytes = args.max_upload_bytes,
        idle_timeout_secs = args.idle_timeout_secs,
        "Loaded configuration"
    );

    let backend: HttpDeclarationBackend = HttpDeclarationBackend::new(&args.persistence_url);
    let app_state: AppState<HttpDeclarationBackend> = AppState {
        sessions: SessionRegistry::new(
            Arc::new(backend),
            Arc::new(TypeBasedGeoPolicy),
            settings,
            LiveEventBroadcaster::new(),
        ),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
