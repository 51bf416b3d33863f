//! Tax rate model for purchasing-service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A selectable tax rate supplied by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxRate {
    /// Percentage, e.g. `21` for 21%.
    pub rate: Decimal,
    pub label: String,
    /// Whether this rate is the default for the document type it was listed
    /// for.
    pub is_default: bool,
    pub is_active: bool,
}
