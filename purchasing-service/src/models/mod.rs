mod credit;
mod document;
mod line;
mod payment;
mod tax_rate;

pub use credit::{CreditOperation, CreditProvider, Installment, InstallmentStatus, Partner};
pub use document::{
    Counterparty, DocumentSettlementView, DocumentStatus, DocumentType, PurchaseDocument,
};
pub use line::{DocumentLine, LineField, LineId, LineInput, PricingMode};
pub use payment::{
    ExistingPayment, Payment, PaymentMethod, PaymentRequest, SettlementDetail,
    SettlementInstruction, SettlementMode,
};
pub use tax_rate::TaxRate;
