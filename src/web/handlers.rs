//! HTTP handlers for the exporter endpoints.

use crate::error::MonitorError;
use crate::metrics::{aggregate, Metric, MetricStore, SlotPayload};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, warn};

const JSON: &str = "application/json";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MetricStore>,
    pub strict_raw_status: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn MetricStore>) -> Self {
        Self {
            store,
            strict_raw_status: false,
        }
    }

    pub fn with_strict_raw_status(mut self, strict: bool) -> Self {
        self.strict_raw_status = strict;
        self
    }
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Serve a slot verbatim, labelled as JSON whatever it holds.
async fn raw_payload(state: &AppState, metric: Metric) -> Response {
    let payload = state.store.read(metric).await;
    let status = match payload {
        SlotPayload::Ready(_) => StatusCode::OK,
        _ if state.strict_raw_status => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (status, [(header::CONTENT_TYPE, JSON)], payload.raw()).into_response()
}

/// `GET /cpu`
pub async fn cpu(State(state): State<AppState>) -> Response {
    raw_payload(&state, Metric::Cpu).await
}

/// `GET /ram`
pub async fn ram(State(state): State<AppState>) -> Response {
    raw_payload(&state, Metric::Memory).await
}

/// `GET /procesos`
pub async fn procesos(State(state): State<AppState>) -> Response {
    raw_payload(&state, Metric::ProcessTable).await
}

/// `GET /metrics`: the three readings merged into one record.
pub async fn combined_metrics(State(state): State<AppState>) -> Result<Response, MonitorError> {
    let slots = state.store.snapshot().await;
    let body = aggregate::combine_to_json(&slots).map_err(|err| {
        match &err {
            MonitorError::Serialize(_) => error!("{}", err),
            _ => warn!("{}", err),
        }
        err
    })?;
    Ok(([(header::CONTENT_TYPE, JSON)], body).into_response())
}

/// `GET /health`: process liveness only, never inspects the slots.
pub async fn health_check() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "OK")
}
