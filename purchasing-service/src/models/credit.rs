//! External-financing models for purchasing-service.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An external credit provider a pending liability can be reclassified to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditProvider {
    pub provider_id: Uuid,
    pub name: String,
    pub is_active: bool,
}

/// A partner who can settle a document out of pocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub partner_id: Uuid,
    pub name: String,
}

/// A financing operation opened by a reclassification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditOperation {
    pub operation_id: Uuid,
    pub provider_id: Uuid,
    pub document_id: Uuid,
    pub gross_amount: Decimal,
    pub installment_count: u32,
    pub provider_reference: Option<String>,
    pub total_paid: Decimal,
    pub total_pending: Decimal,
}

/// One installment of a financing operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    pub installment_id: Uuid,
    pub operation_id: Uuid,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
    pub outstanding_balance: Decimal,
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    Paid,
    Pending,
    Overdue,
}

impl Installment {
    /// Status is derived, not stored: unpaid installments flip to overdue the
    /// day after their due date.
    pub fn status(&self, today: NaiveDate) -> InstallmentStatus {
        if self.paid_date.is_some() {
            InstallmentStatus::Paid
        } else if self.due_date < today {
            InstallmentStatus::Overdue
        } else {
            InstallmentStatus::Pending
        }
    }
}
