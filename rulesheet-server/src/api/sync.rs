//! Sales rule event ingestion

use crate::error::code_for_kind;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use rulesheet_sync::{SalesRuleEvent, SyncReport};
use shared::{ApiResponse, AppError, AppResult};
use std::sync::Arc;

/// Apply a sales rule event to every site it names
///
/// Responds with the per-site report. When any site failed the envelope
/// carries the error code of the first failure; sites that succeeded stay
/// written.
pub async fn sync_sales_rule(
    State(state): State<Arc<AppState>>,
    Json(event): Json<SalesRuleEvent>,
) -> AppResult<ApiResponse<SyncReport>> {
    if event.rule.schedule_id.is_none() {
        return Err(AppError::required("rule.schedule_id"));
    }
    if event.target_count() == 0 {
        return Err(AppError::validation(
            "activate_on or deactivate_on must name at least one site",
        ));
    }

    let report = state.engine.process_event(&event).await;

    let first_failure = report
        .failures()
        .find_map(|site| site.failure_kind())
        .map(code_for_kind);
    let Some(code) = first_failure else {
        tracing::info!(
            schedule_id = ?report.schedule_id,
            sites = report.sites.len(),
            "Sales rule synchronized"
        );
        return Ok(ApiResponse::success(report));
    };

    let failed = report.failures().count();
    tracing::warn!(
        schedule_id = ?report.schedule_id,
        failed,
        sites = report.sites.len(),
        "Sales rule partially synchronized"
    );
    let message = format!("{failed} of {} sites failed", report.sites.len());
    Ok(ApiResponse::failure_with_data(code, message, report))
}
