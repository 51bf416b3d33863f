//! Line pricing engine.
//!
//! Derives a line's subtotal, tax amount and total from its raw inputs under
//! the document's pricing convention. Tax-exclusive pricing adds tax on top of
//! the entered unit price; tax-inclusive pricing treats the entered price as
//! the observed receipt price and derives the tax-exclusive base backward from
//! the fixed total.

use anyhow::anyhow;
use rust_decimal::{Decimal, RoundingStrategy};
use service_core::error::AppError;

use crate::models::{DocumentLine, DocumentType, LineId, LineInput, PricingMode};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round to 2 decimals at a storage point. The scale is pinned afterwards:
/// rounding alone leaves whole-number inputs at scale 0 and they would
/// serialize as "121" instead of "121.00".
pub(crate) fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Round the back-computed unit price. Kept at 4 decimals: a 2-decimal unit
/// price recombined downstream with quantity and tax rate can land a cent off
/// the original ticket total.
fn round_unit_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

fn validate(input: &LineInput) -> Result<(), AppError> {
    if input.tax_rate <= -HUNDRED {
        return Err(AppError::BadRequest(anyhow!(
            "tax rate must be greater than -100%"
        )));
    }
    if input.discount_percent < Decimal::ZERO || input.discount_percent > HUNDRED {
        return Err(AppError::BadRequest(anyhow!(
            "discount must be between 0 and 100%"
        )));
    }
    Ok(())
}

/// Compute a line's derived amounts from its raw inputs.
pub fn compute_line(
    id: LineId,
    input: &LineInput,
    mode: PricingMode,
    document_type: DocumentType,
) -> Result<DocumentLine, AppError> {
    validate(input)?;

    match mode {
        PricingMode::TaxExclusive => compute_exclusive(id, input, document_type),
        PricingMode::TaxInclusive => compute_inclusive(id, input, document_type),
    }
}

fn compute_exclusive(
    id: LineId,
    input: &LineInput,
    document_type: DocumentType,
) -> Result<DocumentLine, AppError> {
    let gross = input.quantity * input.unit_price;
    let discount = gross * input.discount_percent / HUNDRED;
    let subtotal = round_money(gross - discount);
    let tax_amount = round_money(subtotal * input.tax_rate / HUNDRED);
    // Both terms are already at 2 decimals, so the sum needs no re-rounding
    // and `total == subtotal + tax_amount` holds exactly.
    let total = subtotal + tax_amount;

    let withholding_amount = if document_type.supports_withholding() {
        round_money(subtotal * input.withholding_rate / HUNDRED)
    } else {
        Decimal::ZERO
    };

    Ok(DocumentLine {
        id,
        concept: input.concept.clone(),
        description: input.description.clone(),
        quantity: input.quantity,
        unit_price: input.unit_price,
        discount_percent: input.discount_percent,
        tax_rate: input.tax_rate,
        withholding_rate: input.withholding_rate,
        subtotal,
        tax_amount,
        total,
        withholding_amount,
    })
}

fn compute_inclusive(
    id: LineId,
    input: &LineInput,
    document_type: DocumentType,
) -> Result<DocumentLine, AppError> {
    let gross = input.quantity * input.unit_price;
    let discount = gross * input.discount_percent / HUNDRED;
    // The rounded total is the authoritative, immutable anchor of this mode;
    // everything else is derived backward from it.
    let total = round_money(gross - discount);

    let divisor = Decimal::ONE + input.tax_rate / HUNDRED;
    let subtotal_raw = total / divisor;
    let subtotal = round_money(subtotal_raw);
    let tax_amount = total - subtotal;

    // Quantity zero yields all-zero amounts; the quantity is treated as 1 in
    // the denominator only, never as 0.
    let quantity_divisor = if input.quantity.is_zero() {
        Decimal::ONE
    } else {
        input.quantity
    };
    let unit_price = round_unit_price(subtotal_raw / quantity_divisor);

    let withholding_amount = if document_type.supports_withholding() {
        round_money(subtotal * input.withholding_rate / HUNDRED)
    } else {
        Decimal::ZERO
    };

    Ok(DocumentLine {
        id,
        concept: input.concept.clone(),
        description: input.description.clone(),
        quantity: input.quantity,
        unit_price,
        discount_percent: input.discount_percent,
        tax_rate: input.tax_rate,
        withholding_rate: input.withholding_rate,
        subtotal,
        tax_amount,
        total,
        withholding_amount,
    })
}

/// Re-run the pricing branch over every line, feeding each line's current
/// stored values back in as raw inputs. Used when the document's pricing mode
/// is toggled; a user-visible recalculation, not a no-op, and potentially
/// lossy.
pub fn recompute_all(
    lines: &[DocumentLine],
    mode: PricingMode,
    document_type: DocumentType,
) -> Result<Vec<DocumentLine>, AppError> {
    lines
        .iter()
        .map(|line| compute_line(line.id, &line.as_input(), mode, document_type))
        .collect()
}
