// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read access to the audit trail.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::ApiError, state::AppState, storage::AuditEvent};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

/// Query parameters for audit log queries.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AuditQueryParams {
    /// Filter by resource type (`wallet`). Requires `resource_id`.
    pub resource_type: Option<String>,
    /// Filter by resource ID (wallet address as created).
    pub resource_id: Option<String>,
    /// Maximum number of results (default 100, max 1000).
    pub limit: Option<usize>,
}

/// Response for audit log queries.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuditLogResponse {
    /// Matching events, newest first.
    pub events: Vec<AuditEvent>,
    /// Number of events returned.
    pub total: usize,
}

/// Query audit events.
///
/// Returns the most recent events, or the history of one resource when
/// `resource_id` is given.
#[utoipa::path(
    get,
    path = "/api/audit/events",
    tag = "Audit",
    params(AuditQueryParams),
    responses(
        (status = 200, description = "Audit events", body = AuditLogResponse),
        (status = 400, description = "Invalid query parameters", body = crate::error::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::error::ErrorBody)
    )
)]
pub async fn query_audit_events(
    State(state): State<AppState>,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<AuditLogResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    let events = match (&params.resource_type, &params.resource_id) {
        (_, Some(resource_id)) => {
            let resource_type = params.resource_type.as_deref().unwrap_or("wallet");
            let mut events = state.audit.search_by_resource(resource_type, resource_id)?;
            events.truncate(limit);
            events
        }
        (Some(_), None) => {
            return Err(ApiError::bad_request("resource_type requires resource_id"));
        }
        (None, None) => state.audit.list_recent(limit)?,
    };

    Ok(Json(AuditLogResponse {
        total: events.len(),
        events,
    }))
}
