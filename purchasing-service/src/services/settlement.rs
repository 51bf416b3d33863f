//! Payment settlement engine.
//!
//! Validates a requested payment against the document's settlement view and
//! produces the instruction sent to the ledger. The engine never mutates
//! balances itself: after every submission the view is re-fetched from the
//! ledger, which is the only source of truth for `paid` and `pending`.

use anyhow::anyhow;
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    CreditProvider, DocumentSettlementView, PaymentRequest, SettlementDetail,
    SettlementInstruction, SettlementMode,
};
use crate::services::metrics::{PAYMENTS_TOTAL, SETTLEMENT_REJECTIONS_TOTAL};
use crate::services::ledger::SettlementLedger;
use crate::utils::parse_decimal;

/// Amounts within one cent of the pending balance are not an overage.
fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn reject(reason: &'static str, err: AppError) -> AppError {
    SETTLEMENT_REJECTIONS_TOTAL
        .with_label_values(&[reason])
        .inc();
    err
}

/// Validate a payment request and build the settlement instruction.
///
/// `active_providers` is consulted for financing requests only; pass an empty
/// slice otherwise.
pub fn prepare(
    view: &DocumentSettlementView,
    request: &PaymentRequest,
    active_providers: &[CreditProvider],
) -> Result<SettlementInstruction, AppError> {
    // The amount is always entered and validated as a positive magnitude,
    // whatever the document's sign.
    let amount = parse_decimal(&request.amount);
    if amount <= Decimal::ZERO {
        return Err(reject(
            "non_positive_amount",
            AppError::BadRequest(anyhow!("payment amount must be a positive number")),
        ));
    }

    // When editing an existing payment its own prior contribution must not
    // count against the balance it is validated against.
    let mut max_allowed = view.pending_amount.abs();
    if let Some(prior) = &request.editing {
        max_allowed += prior.amount.abs();
    }

    if amount > max_allowed + tolerance() && !request.confirm_overage {
        return Err(reject(
            "overage_unconfirmed",
            AppError::ConfirmationRequired {
                requested: amount,
                max_allowed,
            },
        ));
    }

    match &request.detail {
        SettlementDetail::Standard { method, .. } => {
            if request.editing.is_some() {
                return Err(reject(
                    "edit_standard_payment",
                    AppError::UnsupportedOperation(
                        "a standard payment cannot be edited; delete it and register a new one"
                            .to_string(),
                    ),
                ));
            }
            if !method.is_standard() {
                return Err(reject(
                    "reserved_method",
                    AppError::BadRequest(anyhow!(
                        "payment method '{}' is reserved for its own settlement mode",
                        method.as_str()
                    )),
                ));
            }
        }
        SettlementDetail::Personal { .. } => {
            if view.is_refund() {
                return Err(reject(
                    "personal_on_refund",
                    AppError::BadRequest(anyhow!(
                        "personal settlement is not available when money is owed back to the company"
                    )),
                ));
            }
        }
        SettlementDetail::Financing {
            provider_id,
            installment_count,
            fee_amount,
            ..
        } => {
            if view.is_refund() {
                return Err(reject(
                    "financing_on_refund",
                    AppError::BadRequest(anyhow!(
                        "financing is not available when money is owed back to the company"
                    )),
                ));
            }
            if *installment_count < 1 {
                return Err(reject(
                    "no_installments",
                    AppError::BadRequest(anyhow!("at least one installment is required")),
                ));
            }
            if *fee_amount < Decimal::ZERO {
                return Err(reject(
                    "negative_fee",
                    AppError::BadRequest(anyhow!("financing fee cannot be negative")),
                ));
            }
            if !active_providers
                .iter()
                .any(|p| p.is_active && p.provider_id == *provider_id)
            {
                return Err(reject(
                    "unknown_provider",
                    AppError::BadRequest(anyhow!("unknown or inactive credit provider")),
                ));
            }
        }
    }

    // Financing reclassifies the whole outstanding liability; the other two
    // modes settle exactly the requested amount, negated on refund documents.
    let signed_amount = match request.detail {
        SettlementDetail::Financing { .. } => view.pending_amount,
        _ if view.is_refund() => -amount,
        _ => amount,
    };

    Ok(SettlementInstruction {
        document_id: view.document_id,
        amount: signed_amount,
        payment_date: request.payment_date,
        notes: request.notes.clone(),
        detail: request.detail.clone(),
        idempotency_key: Uuid::new_v4(),
        registered_by: request.registered_by,
    })
}

/// Issue a prepared instruction and re-read the resulting balances.
#[instrument(skip(ledger, instruction), fields(document_id = %instruction.document_id))]
pub async fn submit(
    ledger: &dyn SettlementLedger,
    instruction: &SettlementInstruction,
) -> Result<(Uuid, DocumentSettlementView), AppError> {
    let mode = instruction.detail.mode();
    let payment_id = ledger.submit_payment(instruction).await?;

    PAYMENTS_TOTAL
        .with_label_values(&[mode_label(mode)])
        .inc();
    info!(
        payment_id = %payment_id,
        amount = %instruction.amount,
        mode = mode_label(mode),
        "Settlement instruction accepted"
    );

    // Pessimistic refresh: never trust locally computed balances.
    let view = ledger.get_settlement_view(instruction.document_id).await?;
    Ok((payment_id, view))
}

/// Delete a standard payment and re-read the document's balances.
///
/// Privilege-gated; the only supported way to amend a standard payment.
#[instrument(skip(ledger), fields(payment_id = %payment_id))]
pub async fn delete_payment(
    ledger: &dyn SettlementLedger,
    privileged: bool,
    payment_id: Uuid,
) -> Result<DocumentSettlementView, AppError> {
    if !privileged {
        return Err(AppError::Forbidden(anyhow!(
            "deleting a payment requires elevated privilege"
        )));
    }

    let payment = ledger
        .get_payment(payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("payment not found")))?;

    if !payment.method.is_standard() {
        return Err(AppError::UnsupportedOperation(
            "only standard payments can be deleted; personal and financing settlements must be reversed in the ledger".to_string(),
        ));
    }

    ledger.delete_payment(payment_id).await?;
    info!(document_id = %payment.document_id, "Payment deleted");

    ledger.get_settlement_view(payment.document_id).await
}

fn mode_label(mode: SettlementMode) -> &'static str {
    match mode {
        SettlementMode::Standard => "standard",
        SettlementMode::Personal => "personal",
        SettlementMode::Financing => "financing",
    }
}
