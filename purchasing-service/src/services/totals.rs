//! Document totals aggregator.
//!
//! A pure function over the current line set, re-run on every mutation. Sums
//! are plain: each line already carries its own rounding and the aggregate
//! adds nothing on top.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{DocumentLine, TaxRate};

/// One row of a per-rate breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct TaxBreakdownEntry {
    pub rate: Decimal,
    pub amount: Decimal,
    pub label: String,
}

/// Aggregated document totals with per-rate breakdowns for display.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub withholding_amount: Decimal,
    /// Ordered by descending rate.
    pub tax_breakdown: Vec<TaxBreakdownEntry>,
    /// Only rates with a non-zero retained amount appear.
    pub withholding_breakdown: Vec<TaxBreakdownEntry>,
}

/// Caller-supplied rate-to-name lookup for breakdown labels.
#[derive(Debug, Clone, Default)]
pub struct TaxNames {
    names: HashMap<Decimal, String>,
}

impl TaxNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rates(rates: &[TaxRate]) -> Self {
        Self {
            names: rates
                .iter()
                .map(|r| (r.rate.normalize(), r.label.clone()))
                .collect(),
        }
    }

    pub fn label(&self, rate: Decimal) -> String {
        self.names
            .get(&rate.normalize())
            .cloned()
            .unwrap_or_else(|| format!("TAX {}%", rate.normalize()))
    }
}

/// Aggregate a document's lines into totals and per-rate breakdowns.
pub fn aggregate(lines: &[DocumentLine], names: &TaxNames) -> DocumentTotals {
    let mut subtotal = Decimal::ZERO;
    let mut tax_amount = Decimal::ZERO;
    let mut total = Decimal::ZERO;
    let mut withholding_amount = Decimal::ZERO;

    let mut tax_by_rate: BTreeMap<Decimal, Decimal> = BTreeMap::new();
    let mut withholding_by_rate: BTreeMap<Decimal, Decimal> = BTreeMap::new();

    for line in lines {
        subtotal += line.subtotal;
        tax_amount += line.tax_amount;
        total += line.total;
        withholding_amount += line.withholding_amount;

        *tax_by_rate.entry(line.tax_rate.normalize()).or_default() += line.tax_amount;
        if !line.withholding_amount.is_zero() {
            *withholding_by_rate
                .entry(line.withholding_rate.normalize())
                .or_default() += line.withholding_amount;
        }
    }

    let breakdown = |grouped: BTreeMap<Decimal, Decimal>| -> Vec<TaxBreakdownEntry> {
        grouped
            .into_iter()
            .rev()
            .map(|(rate, amount)| TaxBreakdownEntry {
                rate,
                amount,
                label: names.label(rate),
            })
            .collect()
    };

    DocumentTotals {
        subtotal,
        tax_amount,
        total,
        withholding_amount,
        tax_breakdown: breakdown(tax_by_rate),
        withholding_breakdown: breakdown(withholding_by_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentType, LineId, LineInput, PricingMode};
    use crate::services::pricing::compute_line;
    use rust_decimal_macros::dec;

    fn line(unit_price: Decimal, tax_rate: Decimal, withholding_rate: Decimal) -> DocumentLine {
        let input = LineInput {
            concept: "Line".to_string(),
            quantity: dec!(1),
            unit_price,
            tax_rate,
            withholding_rate,
            ..LineInput::default()
        };
        compute_line(
            LineId::transient(),
            &input,
            PricingMode::TaxExclusive,
            DocumentType::Invoice,
        )
        .expect("line computes")
    }

    #[test]
    fn aggregate_sums_lines_without_extra_rounding() {
        let lines = vec![
            line(dec!(10.01), dec!(21), dec!(0)),
            line(dec!(20.02), dec!(21), dec!(0)),
            line(dec!(5.55), dec!(10), dec!(0)),
        ];
        let totals = aggregate(&lines, &TaxNames::new());

        let expected_total: Decimal = lines.iter().map(|l| l.total).sum();
        let expected_subtotal: Decimal = lines.iter().map(|l| l.subtotal).sum();
        assert_eq!(totals.total, expected_total);
        assert_eq!(totals.subtotal, expected_subtotal);
    }

    #[test]
    fn tax_breakdown_groups_by_rate_descending() {
        let lines = vec![
            line(dec!(100), dec!(10), dec!(0)),
            line(dec!(100), dec!(21), dec!(0)),
            line(dec!(50), dec!(10), dec!(0)),
        ];
        let totals = aggregate(&lines, &TaxNames::new());

        assert_eq!(totals.tax_breakdown.len(), 2);
        assert_eq!(totals.tax_breakdown[0].rate, dec!(21));
        assert_eq!(totals.tax_breakdown[0].amount, dec!(21.00));
        assert_eq!(totals.tax_breakdown[1].rate, dec!(10));
        assert_eq!(totals.tax_breakdown[1].amount, dec!(15.00));
    }

    #[test]
    fn breakdown_labels_resolve_with_fallback() {
        let rates = vec![TaxRate {
            rate: dec!(21),
            label: "VAT 21%".to_string(),
            is_default: true,
            is_active: true,
        }];
        let names = TaxNames::from_rates(&rates);
        let lines = vec![
            line(dec!(100), dec!(21), dec!(0)),
            line(dec!(100), dec!(4), dec!(0)),
        ];
        let totals = aggregate(&lines, &names);

        assert_eq!(totals.tax_breakdown[0].label, "VAT 21%");
        assert_eq!(totals.tax_breakdown[1].label, "TAX 4%");
    }

    #[test]
    fn withholding_breakdown_skips_zero_amounts() {
        let lines = vec![
            line(dec!(1000), dec!(21), dec!(15)),
            line(dec!(500), dec!(21), dec!(0)),
        ];
        let totals = aggregate(&lines, &TaxNames::new());

        assert_eq!(totals.withholding_breakdown.len(), 1);
        assert_eq!(totals.withholding_breakdown[0].rate, dec!(15));
        assert_eq!(totals.withholding_breakdown[0].amount, dec!(150.00));
        assert_eq!(totals.withholding_amount, dec!(150.00));
    }

    #[test]
    fn empty_line_set_aggregates_to_zero() {
        let totals = aggregate(&[], &TaxNames::new());
        assert_eq!(totals.subtotal, dec!(0));
        assert_eq!(totals.total, dec!(0));
        assert!(totals.tax_breakdown.is_empty());
    }
}
