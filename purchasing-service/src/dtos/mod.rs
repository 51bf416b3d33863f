//! Request and response DTOs for purchasing-service.
//!
//! Numeric fields that come from user-facing input arrive as raw text and go
//! through the decimal normalizer server-side, so both `,` and `.` entries
//! behave the same everywhere.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    CreditOperation, DocumentLine, DocumentSettlementView, DocumentType, ExistingPayment,
    Installment, InstallmentStatus, LineId, LineInput, PricingMode, SettlementDetail,
};
use crate::services::DocumentTotals;
use crate::utils::parse_decimal;

/// One line as submitted by the editing client. Amount fields are the raw
/// field text; missing fields default to empty. Serialize is needed so
/// validation failures can echo the offending value back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemDto {
    /// Persisted id when re-saving an existing line, absent for new lines.
    pub id: Option<Uuid>,
    pub concept: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit_price: String,
    #[serde(default)]
    pub discount_percent: String,
    #[serde(default)]
    pub tax_rate: String,
    #[serde(default)]
    pub withholding_rate: String,
}

impl LineItemDto {
    pub fn into_input(self) -> (LineId, LineInput) {
        let id = match self.id {
            Some(id) => LineId::Persisted(id),
            None => LineId::transient(),
        };
        let input = LineInput {
            concept: self.concept,
            description: self.description,
            quantity: parse_decimal(&self.quantity),
            unit_price: parse_decimal(&self.unit_price),
            discount_percent: parse_decimal(&self.discount_percent),
            tax_rate: parse_decimal(&self.tax_rate),
            withholding_rate: parse_decimal(&self.withholding_rate),
        };
        (id, input)
    }
}

/// Replace-set save of a document's lines.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveLinesRequest {
    pub document_type: DocumentType,
    pub pricing_mode: PricingMode,
    #[validate(length(max = 500, message = "too many lines"))]
    pub lines: Vec<LineItemDto>,
}

#[derive(Debug, Serialize)]
pub struct SaveLinesResponse {
    pub lines: Vec<DocumentLine>,
    pub totals: DocumentTotals,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPaymentRequest {
    /// Raw text of the amount field, always a positive magnitude.
    pub amount: String,
    pub payment_date: NaiveDate,
    #[serde(default)]
    #[validate(length(max = 1000, message = "notes are limited to 1000 characters"))]
    pub notes: Option<String>,
    #[serde(default)]
    pub confirm_overage: bool,
    #[serde(default)]
    pub editing: Option<ExistingPayment>,
    #[serde(flatten)]
    pub detail: SettlementDetail,
}

#[derive(Debug, Serialize)]
pub struct RegisterPaymentResponse {
    pub payment_id: Uuid,
    pub view: DocumentSettlementView,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    /// Unsaved line edits to persist before the number is assigned. If this
    /// save fails the approval is aborted.
    #[serde(default)]
    pub pending_edit: Option<SaveLinesRequest>,
}

#[derive(Debug, Serialize)]
pub struct ApproveResponse {
    pub document_number: String,
    pub view: DocumentSettlementView,
}

/// One installment with its derived status attached for display.
#[derive(Debug, Serialize)]
pub struct InstallmentView {
    #[serde(flatten)]
    pub installment: Installment,
    pub status: InstallmentStatus,
}

/// The financing operation opened for a document plus its schedule.
#[derive(Debug, Serialize)]
pub struct FinancingView {
    pub operation: CreditOperation,
    pub installments: Vec<InstallmentView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use rust_decimal_macros::dec;

    #[test]
    fn line_dto_parses_locale_ambiguous_amounts() {
        let dto = LineItemDto {
            id: None,
            concept: "Materials".to_string(),
            description: None,
            quantity: "2".to_string(),
            unit_price: "1.234,56".to_string(),
            discount_percent: String::new(),
            tax_rate: "21".to_string(),
            withholding_rate: String::new(),
        };
        let (id, input) = dto.into_input();
        assert!(matches!(id, LineId::Transient(_)));
        assert_eq!(input.unit_price, dec!(1234.56));
        assert_eq!(input.discount_percent, dec!(0));
    }

    #[test]
    fn oversized_line_sets_fail_validation() {
        let line = LineItemDto {
            id: None,
            concept: "Materials".to_string(),
            description: None,
            quantity: "1".to_string(),
            unit_price: "10".to_string(),
            discount_percent: String::new(),
            tax_rate: "21".to_string(),
            withholding_rate: String::new(),
        };
        let request = SaveLinesRequest {
            document_type: crate::models::DocumentType::Invoice,
            pricing_mode: crate::models::PricingMode::TaxExclusive,
            lines: vec![line; 501],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn payment_request_detail_flattens_by_mode_tag() {
        let body = serde_json::json!({
            "amount": "150,00",
            "payment_date": "2026-08-27",
            "mode": "standard",
            "method": "bank_transfer",
            "bank_account_id": null,
            "bank_reference": "REF-1"
        });
        let request: RegisterPaymentRequest =
            serde_json::from_value(body).expect("deserializes");
        assert!(matches!(
            request.detail,
            SettlementDetail::Standard {
                method: PaymentMethod::BankTransfer,
                ..
            }
        ));
        assert!(!request.confirm_overage);
    }

    #[test]
    fn financing_detail_carries_installments_and_fee() {
        let body = serde_json::json!({
            "amount": "900",
            "payment_date": "2026-08-27",
            "mode": "financing",
            "provider_id": Uuid::new_v4(),
            "installment_count": 6,
            "fee_amount": "30.00",
            "bank_account_id": null
        });
        let request: RegisterPaymentRequest =
            serde_json::from_value(body).expect("deserializes");
        match request.detail {
            SettlementDetail::Financing {
                installment_count,
                fee_amount,
                ..
            } => {
                assert_eq!(installment_count, 6);
                assert_eq!(fee_amount, dec!(30.00));
            }
            other => panic!("wrong detail: {other:?}"),
        }
    }
}
