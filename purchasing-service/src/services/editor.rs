//! Line editor session.
//!
//! Holds the mutable editing state of one document's line set: raw inputs,
//! derived amounts, the per-field echo buffer and the document-level pricing
//! mode. Every numeric edit re-runs the pricing engine on the touched line;
//! totals are recomputed from scratch on demand.

use anyhow::anyhow;
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{DocumentLine, DocumentType, LineField, LineId, LineInput, PricingMode};
use crate::services::ledger::SettlementLedger;
use crate::services::metrics::LINE_SAVES_TOTAL;
use crate::services::pricing::{compute_line, recompute_all};
use crate::services::totals::{aggregate, DocumentTotals, TaxNames};
use crate::utils::{parse_decimal, EchoBuffer};

pub struct LineEditor {
    document_id: Uuid,
    document_type: DocumentType,
    mode: PricingMode,
    default_tax_rate: Decimal,
    lines: Vec<DocumentLine>,
    echo: EchoBuffer,
}

impl LineEditor {
    /// Open an empty editing session with the document type's default mode.
    pub fn new(document_id: Uuid, document_type: DocumentType, default_tax_rate: Decimal) -> Self {
        Self {
            document_id,
            document_type,
            mode: document_type.default_pricing_mode(),
            default_tax_rate,
            lines: Vec::new(),
            echo: EchoBuffer::new(),
        }
    }

    /// Open a session over an incoming line set, computing every line under
    /// the given mode.
    pub fn from_inputs(
        document_id: Uuid,
        document_type: DocumentType,
        mode: PricingMode,
        default_tax_rate: Decimal,
        inputs: Vec<(LineId, LineInput)>,
    ) -> Result<Self, AppError> {
        let lines = inputs
            .into_iter()
            .map(|(id, input)| compute_line(id, &input, mode, document_type))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            document_id,
            document_type,
            mode,
            default_tax_rate,
            lines,
            echo: EchoBuffer::new(),
        })
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn pricing_mode(&self) -> PricingMode {
        self.mode
    }

    pub fn lines(&self) -> &[DocumentLine] {
        &self.lines
    }

    /// Append a blank line pre-filled with the default tax rate.
    pub fn add_line(&mut self) -> Result<usize, AppError> {
        let input = LineInput {
            tax_rate: self.default_tax_rate,
            ..LineInput::default()
        };
        let line = compute_line(LineId::transient(), &input, self.mode, self.document_type)?;
        self.lines.push(line);
        self.echo.clear_all();
        Ok(self.lines.len() - 1)
    }

    pub fn remove_line(&mut self, row: usize) -> Result<(), AppError> {
        self.ensure_row(row)?;
        self.lines.remove(row);
        self.echo.clear_all();
        Ok(())
    }

    /// Apply a keystroke-level edit to a numeric field: remember the literal
    /// text for display, parse it, and recompute the line.
    pub fn edit_field(&mut self, row: usize, field: LineField, raw: &str) -> Result<(), AppError> {
        self.ensure_row(row)?;
        self.echo.set(row, field, raw);

        let mut input = self.lines[row].as_input();
        let value = parse_decimal(raw);
        match field {
            LineField::Quantity => input.quantity = value,
            LineField::UnitPrice => input.unit_price = value,
            LineField::DiscountPercent => input.discount_percent = value,
            LineField::TaxRate => input.tax_rate = value,
            LineField::WithholdingRate => input.withholding_rate = value,
        }

        self.lines[row] = compute_line(self.lines[row].id, &input, self.mode, self.document_type)?;
        Ok(())
    }

    /// Field lost focus; the formatted value takes over from the echo.
    pub fn blur(&mut self, row: usize, field: LineField) {
        self.echo.clear(row, field);
    }

    /// What a numeric field should show right now: the in-progress keystrokes
    /// if the field is focused, the formatted stored value otherwise.
    pub fn display(&self, row: usize, field: LineField) -> Result<String, AppError> {
        self.ensure_row(row)?;
        let line = &self.lines[row];
        let value = match field {
            LineField::Quantity => line.quantity,
            LineField::UnitPrice => line.unit_price,
            LineField::DiscountPercent => line.discount_percent,
            LineField::TaxRate => line.tax_rate,
            LineField::WithholdingRate => line.withholding_rate,
        };
        Ok(self.echo.display(row, field, value))
    }

    pub fn set_concept(&mut self, row: usize, concept: &str) -> Result<(), AppError> {
        self.ensure_row(row)?;
        self.lines[row].concept = concept.to_string();
        Ok(())
    }

    pub fn set_description(&mut self, row: usize, description: Option<String>) -> Result<(), AppError> {
        self.ensure_row(row)?;
        self.lines[row].description = description;
        Ok(())
    }

    /// Switch the document's pricing convention and recompute every line. The
    /// stored unit prices are reinterpreted under the new mode, so toggling
    /// back does not restore the previous amounts.
    pub fn set_pricing_mode(&mut self, mode: PricingMode) -> Result<(), AppError> {
        if mode == self.mode {
            return Ok(());
        }
        self.lines = recompute_all(&self.lines, mode, self.document_type)?;
        self.mode = mode;
        self.echo.clear_all();
        Ok(())
    }

    pub fn totals(&self, names: &TaxNames) -> DocumentTotals {
        aggregate(&self.lines, names)
    }

    /// Persist the full line set as a replace-set write.
    ///
    /// Lines whose concept is still blank fail validation; amounts are always
    /// valid because they are recomputed on every edit.
    #[instrument(skip(self, ledger), fields(document_id = %self.document_id))]
    pub async fn save(&self, ledger: &dyn SettlementLedger) -> Result<(), AppError> {
        if let Some(row) = self.lines.iter().position(|l| l.concept.trim().is_empty()) {
            return Err(AppError::BadRequest(anyhow!(
                "line {} has no concept; every line needs one before saving",
                row + 1
            )));
        }

        ledger.save_document_lines(self.document_id, &self.lines).await?;

        LINE_SAVES_TOTAL
            .with_label_values(&[self.document_type.as_str()])
            .inc();
        info!(lines = self.lines.len(), "Document lines saved");
        Ok(())
    }

    fn ensure_row(&self, row: usize) -> Result<(), AppError> {
        if row >= self.lines.len() {
            return Err(AppError::BadRequest(anyhow!("line {} does not exist", row + 1)));
        }
        Ok(())
    }
}
