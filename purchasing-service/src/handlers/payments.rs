//! Payment settlement handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{RegisterPaymentRequest, RegisterPaymentResponse},
    middleware::ActorContext,
    models::{DocumentSettlementView, PaymentRequest, SettlementDetail},
    services::{lifecycle, settlement},
    AppState,
};

/// Register a payment (or personal/financing settlement) against a document.
pub async fn register_payment(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<RegisterPaymentRequest>,
) -> Result<(StatusCode, Json<RegisterPaymentResponse>), AppError> {
    payload.validate()?;

    let view = state.ledger.get_settlement_view(document_id).await?;
    lifecycle::ensure_can_register_payment(&view)?;

    // Providers are only consulted for financing requests.
    let providers = match payload.detail {
        SettlementDetail::Financing { .. } => state.ledger.list_credit_providers().await?,
        _ => Vec::new(),
    };

    let request = PaymentRequest {
        amount: payload.amount,
        payment_date: payload.payment_date,
        notes: payload.notes,
        detail: payload.detail,
        confirm_overage: payload.confirm_overage,
        editing: payload.editing,
        registered_by: actor.user_id,
    };

    let instruction = settlement::prepare(&view, &request, &providers)?;
    let (payment_id, view) = settlement::submit(state.ledger.as_ref(), &instruction).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterPaymentResponse { payment_id, view }),
    ))
}

/// Delete a standard payment. Privilege-gated.
pub async fn delete_payment(
    State(state): State<AppState>,
    actor: ActorContext,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<DocumentSettlementView>, AppError> {
    let view =
        settlement::delete_payment(state.ledger.as_ref(), actor.is_admin(), payment_id).await?;
    Ok(Json(view))
}
