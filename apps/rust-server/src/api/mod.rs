// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::{HeaderName, Request},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    models::{CreateWalletRequest, TransferRequest, TransferResponse, WalletSummary},
    state::AppState,
    storage::{AuditEvent, AuditEventType},
};

pub mod audit;
pub mod health;
pub mod wallets;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let api_routes = Router::new()
        .route(
            "/wallets",
            get(wallets::list_wallets).post(wallets::create_wallet),
        )
        .route("/wallets/transfer", post(wallets::transfer))
        .route("/audit/events", get(audit::query_audit_events));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        wallets::create_wallet,
        wallets::list_wallets,
        wallets::transfer,
        audit::query_audit_events
    ),
    components(
        schemas(
            CreateWalletRequest,
            WalletSummary,
            TransferRequest,
            TransferResponse,
            ErrorBody,
            AuditEvent,
            AuditEventType,
            audit::AuditLogResponse,
            crate::blockchain::Currency,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Wallets", description = "Custodial wallets and sweep transfers"),
        (name = "Audit", description = "Security audit trail")
    )
)]
pub struct ApiDoc;
