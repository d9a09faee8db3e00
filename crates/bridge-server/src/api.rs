use axum::{
    Router,
    extract::{DefaultBodyLimit, Query, State, rejection::JsonRejection},
    middleware,
    response::{
        IntoResponse, Json, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use chrono::{SecondsFormat, Utc};
use domain::job::{JobOutcome, JobSpec};
use domain::label::{LabelBoard, LabelElement, LabelPage, Rotation};
use domain::printer::{ConnectionKind, PrinterHandle};
use futures::Stream;
use infrastructure::BridgeConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

/// Image payloads arrive inline as base64
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/print-label", post(print_label))
        .route("/print-label/cancel", post(cancel_print))
        .route("/printer/status", get(printer_status))
        .route("/printer/scan", get(scan_printers))
        .route("/printer/events", get(sse_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Explicit target; both name and port are needed to skip the scan
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterTarget {
    #[serde(default, alias = "printerName")]
    pub name: Option<String>,
    #[serde(default)]
    pub port: Option<u32>,
    #[serde(default)]
    pub kind: ConnectionKind,
}

impl PrinterTarget {
    fn handle(&self) -> Option<PrinterHandle> {
        match (&self.name, self.port) {
            (Some(name), Some(port)) if !name.is_empty() => Some(PrinterHandle {
                name: name.clone(),
                port,
                kind: self.kind,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotate: Rotation,
    #[serde(default)]
    pub density: Option<u8>,
    /// Friendly name (`GAP_PAPER`) or vendor code
    #[serde(default)]
    pub label_type: Option<Value>,
    /// Friendly name (`THERMAL`) or vendor code
    #[serde(default)]
    pub print_mode: Option<Value>,
}

/// Additional label design printed after the main one
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotate: Rotation,
    #[serde(default)]
    pub content: Vec<LabelElement>,
    #[serde(default)]
    pub copies: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintLabelRequest {
    #[serde(default)]
    pub printer: Option<PrinterTarget>,
    pub label: LabelRequest,
    pub content: Vec<LabelElement>,
    #[serde(default)]
    pub copies: Option<u32>,
    #[serde(default)]
    pub pages: Vec<PageRequest>,
}

impl PrintLabelRequest {
    /// Fill in the configured defaults and flatten into job pages
    pub fn into_job_spec(self, config: &BridgeConfig) -> JobSpec {
        let label = self.label;
        let first = LabelPage::new(
            LabelBoard {
                width: label.width,
                height: label.height,
                rotate: label.rotate,
            },
            self.content,
            self.copies.unwrap_or(1),
        );
        let rest = self.pages.into_iter().map(|page| {
            LabelPage::new(
                LabelBoard {
                    width: page.width,
                    height: page.height,
                    rotate: page.rotate,
                },
                page.content,
                page.copies.unwrap_or(1),
            )
        });

        JobSpec {
            printer: self.printer.as_ref().and_then(PrinterTarget::handle),
            density: label.density.unwrap_or(config.print.density),
            label_type: config.resolve_label_type(label.label_type.as_ref()),
            print_mode: config.resolve_print_mode(label.print_mode.as_ref()),
            pages: std::iter::once(first).chain(rest).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintLabelResponse {
    pub success: bool,
    pub job_id: Uuid,
    pub printer: String,
    pub copies: u32,
    pub printed_labels: u32,
    pub cancelled: bool,
}

impl From<JobOutcome> for PrintLabelResponse {
    fn from(outcome: JobOutcome) -> Self {
        Self {
            success: true,
            job_id: outcome.job_id,
            printer: outcome.printer.name,
            copies: outcome.copies,
            printed_labels: outcome.printed_labels,
            cancelled: outcome.cancelled,
        }
    }
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "wsConnected": state.service.is_connected(),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

async fn print_label(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PrintLabelRequest>, JsonRejection>,
) -> Result<Json<PrintLabelResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected print request: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    let job_id = Uuid::new_v4();
    let spec = request.into_job_spec(&state.config);
    info!(
        job_id = %job_id,
        pages = spec.pages.len(),
        copies = spec.total_copies(),
        "Print request received"
    );

    let outcome = state
        .service
        .run_job_with_id(job_id, spec)
        .await
        .map_err(|e| ApiError::job("Print failed", e, Some(job_id)))?;
    Ok(Json(outcome.into()))
}

async fn cancel_print(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "cancelled": state.service.cancel_job() }))
}

async fn printer_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.status())
}

#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    #[serde(default)]
    pub kind: ConnectionKind,
}

async fn scan_printers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScanQuery>,
) -> Result<Response, ApiError> {
    let scan_failed = |e| ApiError::job("Scan failed", e, None);
    state.service.init_sdk().await.map_err(scan_failed)?;
    let printers = state
        .service
        .scan_printers(query.kind)
        .await
        .map_err(scan_failed)?;
    Ok(Json(json!({ "printers": printers })).into_response())
}

async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.service.subscribe_events();
    let stream = BroadcastStream::new(rx).map(|msg| match msg {
        Ok(event) => Event::default().event(event.event_type()).json_data(&event),
        Err(_) => Ok(Event::default().comment("events dropped")),
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
