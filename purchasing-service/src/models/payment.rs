//! Payment and settlement models for purchasing-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment method.
///
/// `Personal` and `ExternalCredit` are reserved markers for the other two
/// settlement modes; they are excluded from the standard method selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
    DirectDebit,
    Check,
    Personal,
    ExternalCredit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Card => "card",
            PaymentMethod::DirectDebit => "direct_debit",
            PaymentMethod::Check => "check",
            PaymentMethod::Personal => "personal",
            PaymentMethod::ExternalCredit => "external_credit",
        }
    }

    /// Whether this method may be chosen for a standard-mode payment.
    pub fn is_standard(&self) -> bool {
        !matches!(self, PaymentMethod::Personal | PaymentMethod::ExternalCredit)
    }
}

/// One recorded money movement against a purchase document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: Uuid,
    pub document_id: Uuid,
    /// Signed: negative on refund-due documents.
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub bank_reference: Option<String>,
    pub bank_account_id: Option<Uuid>,
    pub notes: Option<String>,
    pub registered_by: Uuid,
    pub created_utc: DateTime<Utc>,
}

/// The three mutually exclusive ways a pending balance is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementMode {
    Standard,
    Personal,
    Financing,
}

/// Mode-specific payload of a settlement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum SettlementDetail {
    /// Direct company payment or receipt.
    Standard {
        method: PaymentMethod,
        bank_account_id: Option<Uuid>,
        bank_reference: Option<String>,
    },
    /// A partner pays out of pocket; the company now owes the partner.
    Personal { partner_id: Uuid },
    /// The whole pending liability is reclassified to a credit provider and
    /// an installment schedule is opened; no cash moves against the original
    /// counterparty.
    Financing {
        provider_id: Uuid,
        installment_count: u32,
        fee_amount: Decimal,
        bank_account_id: Option<Uuid>,
    },
}

impl SettlementDetail {
    pub fn mode(&self) -> SettlementMode {
        match self {
            SettlementDetail::Standard { .. } => SettlementMode::Standard,
            SettlementDetail::Personal { .. } => SettlementMode::Personal,
            SettlementDetail::Financing { .. } => SettlementMode::Financing,
        }
    }
}

/// A payment being edited, so its own prior amount does not count against the
/// pending balance it is validated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingPayment {
    pub payment_id: Uuid,
    pub amount: Decimal,
}

/// What the user asked for, before validation. The amount arrives as the raw
/// text of the input field and is parsed by the decimal normalizer.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub amount: String,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub detail: SettlementDetail,
    /// Set when the user has explicitly confirmed paying more than pending.
    pub confirm_overage: bool,
    pub editing: Option<ExistingPayment>,
    pub registered_by: Uuid,
}

/// Validated instruction sent to the settlement ledger. The engine never
/// mutates balances itself; the ledger is the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementInstruction {
    pub document_id: Uuid,
    /// Signed: negated for refund-due documents.
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub detail: SettlementDetail,
    /// Client-generated per submission attempt; the ledger de-duplicates
    /// retried submissions by this key.
    pub idempotency_key: Uuid,
    pub registered_by: Uuid,
}
