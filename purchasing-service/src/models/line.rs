//! Document line model for purchasing-service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a document's unit prices are entered with or without tax.
///
/// This is a document-level setting, not a line-level one. Switching it
/// recomputes every line in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    /// Unit prices exclude tax; tax is added on top (default for invoices).
    TaxExclusive,
    /// Unit prices already include tax, as read off a receipt; the
    /// tax-exclusive base is derived backward from the fixed total.
    TaxInclusive,
}

/// Editable numeric fields of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineField {
    Quantity,
    UnitPrice,
    DiscountPercent,
    TaxRate,
    WithholdingRate,
}

/// Identity of a line. Lines get a transient client-side id until the first
/// save persists them; saves are full replace-set writes, so the ledger
/// assigns fresh persisted ids on every save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum LineId {
    Persisted(Uuid),
    Transient(Uuid),
}

impl LineId {
    pub fn transient() -> Self {
        LineId::Transient(Uuid::new_v4())
    }
}

/// Raw inputs of one billable line, before any amounts are derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineInput {
    pub concept: String,
    pub description: Option<String>,
    pub quantity: Decimal,
    /// Meaning depends on the pricing mode: tax-exclusive unit price, or the
    /// tax-inclusive price as entered.
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub tax_rate: Decimal,
    /// Retention rate for professional-services invoices; zero for expenses.
    pub withholding_rate: Decimal,
}

impl Default for LineInput {
    fn default() -> Self {
        Self {
            concept: String::new(),
            description: None,
            quantity: Decimal::ZERO,
            unit_price: Decimal::ZERO,
            discount_percent: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            withholding_rate: Decimal::ZERO,
        }
    }
}

/// One billable line of a purchase document with its derived amounts.
///
/// `subtotal`, `tax_amount`, `total` and `withholding_amount` are never edited
/// directly; they are recomputed by the pricing engine on every field edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLine {
    pub id: LineId,
    pub concept: String,
    pub description: Option<String>,
    pub quantity: Decimal,
    /// Always the tax-exclusive unit price once derived. In tax-inclusive
    /// mode this is back-computed and kept at 4 decimals so a downstream
    /// recomputation from quantity and tax rate reproduces the ticket total.
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub tax_rate: Decimal,
    pub withholding_rate: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    /// Retained tax, deducted from the net payable but not from `total`.
    pub withholding_amount: Decimal,
}

impl DocumentLine {
    /// The raw inputs of this line, for recomputation. The stored unit price
    /// is fed back as entered; callers toggling the pricing mode accept that
    /// this is a one-directional, potentially lossy transform.
    pub fn as_input(&self) -> LineInput {
        LineInput {
            concept: self.concept.clone(),
            description: self.description.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            tax_rate: self.tax_rate,
            withholding_rate: self.withholding_rate,
        }
    }
}
