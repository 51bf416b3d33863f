//! Document status state machine.
//!
//! Centralizes the gating rules the detail screens share, instead of each
//! screen re-deriving them from status fields.

use anyhow::anyhow;
use service_core::error::AppError;

use crate::models::{DocumentSettlementView, DocumentStatus};

/// A document is locked once it reaches an immutable status, or when its
/// explicit lock flag is set.
pub fn is_locked(view: &DocumentSettlementView) -> bool {
    view.lock_flag
        || matches!(
            view.status,
            DocumentStatus::Approved | DocumentStatus::Paid
        )
}

/// Whether the document is in the partial overlay: it has payments but still
/// owes something. Not a lifecycle stage of its own.
pub fn is_partially_paid(view: &DocumentSettlementView) -> bool {
    view.has_payments && !view.pending_amount.is_zero()
}

/// Structural edits (lines, header) require an unlocked document.
pub fn ensure_can_edit_structure(view: &DocumentSettlementView) -> Result<(), AppError> {
    if is_locked(view) {
        return Err(AppError::Conflict(anyhow!(
            "document is locked ({}); lines and header can no longer be edited",
            view.status.as_str()
        )));
    }
    Ok(())
}

/// Payments are not blocked by the edit lock; only structural changes are.
/// A cancelled document, however, accepts nothing.
pub fn ensure_can_register_payment(view: &DocumentSettlementView) -> Result<(), AppError> {
    if view.status == DocumentStatus::Cancelled {
        return Err(AppError::Conflict(anyhow!(
            "cancelled documents do not accept payments"
        )));
    }
    Ok(())
}

/// Approval assigns the definitive sequential number.
///
/// Requires elevated privilege, and either an unlocked document in an
/// approvable status or the legacy-repair path: a document already paid that
/// never received a definitive number.
pub fn ensure_can_approve(
    view: &DocumentSettlementView,
    privileged: bool,
) -> Result<(), AppError> {
    if !privileged {
        return Err(AppError::Forbidden(anyhow!(
            "approving a document requires elevated privilege"
        )));
    }

    let approvable_status = matches!(
        view.status,
        DocumentStatus::Draft
            | DocumentStatus::Pending
            | DocumentStatus::PendingValidation
            | DocumentStatus::Registered
    );
    let legacy_repair = view.status == DocumentStatus::Paid && !view.has_definitive_number;

    if (!is_locked(view) && approvable_status) || legacy_repair {
        Ok(())
    } else {
        Err(AppError::Conflict(anyhow!(
            "document in status {} cannot be approved",
            view.status.as_str()
        )))
    }
}

/// Deletion cascades (lines, then header, then release of any linked scanned
/// source document) and is only allowed before the document enters the
/// registered family.
pub fn ensure_can_delete(view: &DocumentSettlementView) -> Result<(), AppError> {
    if is_locked(view) {
        return Err(AppError::Conflict(anyhow!(
            "locked documents cannot be deleted"
        )));
    }
    if !matches!(
        view.status,
        DocumentStatus::Draft | DocumentStatus::Pending | DocumentStatus::PendingValidation
    ) {
        return Err(AppError::Conflict(anyhow!(
            "document in status {} cannot be deleted",
            view.status.as_str()
        )));
    }
    Ok(())
}
