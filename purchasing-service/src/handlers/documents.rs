//! Document line and lifecycle handlers.

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        ApproveRequest, ApproveResponse, FinancingView, InstallmentView, SaveLinesRequest,
        SaveLinesResponse,
    },
    middleware::ActorContext,
    models::{DocumentSettlementView, PurchaseDocument, TaxRate},
    services::{lifecycle, LineEditor, TaxNames},
    AppState,
};

fn default_rate(rates: &[TaxRate]) -> Decimal {
    rates
        .iter()
        .find(|r| r.is_default && r.is_active)
        .map(|r| r.rate)
        .unwrap_or(Decimal::ZERO)
}

async fn persist_lines(
    state: &AppState,
    document_id: Uuid,
    payload: SaveLinesRequest,
) -> Result<SaveLinesResponse, AppError> {
    payload.validate()?;

    let rates = state
        .ledger
        .get_tax_rates(payload.document_type.as_str())
        .await?;

    let inputs = payload
        .lines
        .into_iter()
        .map(|dto| dto.into_input())
        .collect();
    let editor = LineEditor::from_inputs(
        document_id,
        payload.document_type,
        payload.pricing_mode,
        default_rate(&rates),
        inputs,
    )?;

    editor.save(state.ledger.as_ref()).await?;

    let totals = editor.totals(&TaxNames::from_rates(&rates));
    Ok(SaveLinesResponse {
        lines: editor.lines().to_vec(),
        totals,
    })
}

/// Replace a document's full line set.
pub async fn save_lines(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<SaveLinesRequest>,
) -> Result<Json<SaveLinesResponse>, AppError> {
    let view = state.ledger.get_settlement_view(document_id).await?;
    lifecycle::ensure_can_edit_structure(&view)?;

    tracing::info!(
        document_id = %document_id,
        document_type = payload.document_type.as_str(),
        lines = payload.lines.len(),
        "Saving document lines"
    );

    let response = persist_lines(&state, document_id, payload).await?;
    Ok(Json(response))
}

pub async fn get_document(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(document_id): Path<Uuid>,
) -> Result<Json<PurchaseDocument>, AppError> {
    let document = state.ledger.get_document(document_id).await?;
    Ok(Json(document))
}

/// The financing schedule for a reclassified document.
///
/// Installment status is derived against today's date at read time, never
/// stored.
pub async fn get_financing(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(document_id): Path<Uuid>,
) -> Result<Json<FinancingView>, AppError> {
    let operation = state
        .ledger
        .get_credit_operation(document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("document has no financing operation")))?;

    let today = Utc::now().date_naive();
    let installments = state
        .ledger
        .list_installments(operation.operation_id)
        .await?
        .into_iter()
        .map(|installment| InstallmentView {
            status: installment.status(today),
            installment,
        })
        .collect();

    Ok(Json(FinancingView {
        operation,
        installments,
    }))
}

pub async fn get_settlement(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(document_id): Path<Uuid>,
) -> Result<Json<DocumentSettlementView>, AppError> {
    let view = state.ledger.get_settlement_view(document_id).await?;
    Ok(Json(view))
}

/// Approve a document: assign its definitive sequential number.
///
/// Unsaved line edits travel with the request and are persisted first; if
/// that save fails the approval never reaches the ledger.
pub async fn approve_document(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<ApproveRequest>,
) -> Result<Json<ApproveResponse>, AppError> {
    let view = state.ledger.get_settlement_view(document_id).await?;
    lifecycle::ensure_can_approve(&view, actor.is_admin())?;

    if let Some(pending_edit) = payload.pending_edit {
        lifecycle::ensure_can_edit_structure(&view)?;
        persist_lines(&state, document_id, pending_edit).await?;
    }

    let document_number = state
        .ledger
        .approve_document(document_id, actor.user_id)
        .await?;

    tracing::info!(
        document_id = %document_id,
        document_number = %document_number,
        "Document approved"
    );

    let view = state.ledger.get_settlement_view(document_id).await?;
    Ok(Json(ApproveResponse {
        document_number,
        view,
    }))
}

/// Delete a document, cascading to its lines and any linked scanned source.
pub async fn delete_document(
    State(state): State<AppState>,
    _actor: ActorContext,
    Path(document_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let view = state.ledger.get_settlement_view(document_id).await?;
    lifecycle::ensure_can_delete(&view)?;

    state.ledger.delete_document(document_id).await?;
    tracing::info!(document_id = %document_id, "Document deleted");

    Ok(StatusCode::NO_CONTENT)
}
