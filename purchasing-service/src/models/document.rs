//! Purchase document model for purchasing-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PricingMode;

/// Document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Invoice,
    Expense,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Expense => "expense",
        }
    }

    /// Whether withholding tax applies to this document type.
    pub fn supports_withholding(&self) -> bool {
        matches!(self, DocumentType::Invoice)
    }

    /// The pricing convention a new document of this type starts in.
    pub fn default_pricing_mode(&self) -> PricingMode {
        match self {
            DocumentType::Invoice => PricingMode::TaxExclusive,
            DocumentType::Expense => PricingMode::TaxInclusive,
        }
    }
}

/// Document lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Pending,
    PendingValidation,
    Registered,
    Approved,
    Paid,
    Cancelled,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Pending => "pending",
            DocumentStatus::PendingValidation => "pending_validation",
            DocumentStatus::Registered => "registered",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Paid => "paid",
            DocumentStatus::Cancelled => "cancelled",
        }
    }
}

/// Who the document is payable to. Exactly one identity applies; this is a
/// construction-time invariant, not three nullable columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Counterparty {
    Supplier { supplier_id: Uuid },
    Technician { technician_id: Uuid },
    Manual { beneficiary_name: String },
}

/// Purchase document header.
///
/// Money fields are derived from the lines at save time and re-read from the
/// ledger afterwards; they are never maintained optimistically client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseDocument {
    pub document_id: Uuid,
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    pub counterparty: Counterparty,
    pub project_id: Option<Uuid>,
    pub pricing_mode: PricingMode,
    /// Definitive sequential number, assigned at approval.
    pub document_number: Option<String>,
    pub tax_base: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub is_locked: bool,
    pub created_utc: DateTime<Utc>,
}

/// Read model the settlement engine validates against. Always re-fetched from
/// the ledger after any mutating call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSettlementView {
    pub document_id: Uuid,
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    pub total: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    /// Explicit lock flag, independent of the statuses that imply locking.
    pub lock_flag: bool,
    pub has_definitive_number: bool,
    pub has_payments: bool,
}

impl DocumentSettlementView {
    /// A negative total means the document is a refund due back to the
    /// company; its payments are refunds received.
    pub fn is_refund(&self) -> bool {
        self.total < Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn supplier_counterparty_serializes_with_kind_tag() {
        let supplier_id = Uuid::new_v4();
        let value = serde_json::to_value(Counterparty::Supplier { supplier_id }).unwrap();
        assert_eq!(
            value,
            json!({ "kind": "supplier", "supplier_id": supplier_id })
        );
    }

    #[test]
    fn technician_counterparty_serializes_with_kind_tag() {
        let technician_id = Uuid::new_v4();
        let value = serde_json::to_value(Counterparty::Technician { technician_id }).unwrap();
        assert_eq!(
            value,
            json!({ "kind": "technician", "technician_id": technician_id })
        );
    }

    #[test]
    fn manual_counterparty_round_trips() {
        let original = Counterparty::Manual {
            beneficiary_name: "Road tax office".to_string(),
        };
        let value = serde_json::to_value(&original).unwrap();
        assert_eq!(value["kind"], "manual");
        let back: Counterparty = serde_json::from_value(value).unwrap();
        assert_eq!(back, original);
    }
}
