//! Decimal input normalization for money and quantity fields.
//!
//! Every numeric field in the editors accepts both `,` and `.` as the decimal
//! separator. The rules are deterministic: a comma is always authoritative as
//! the decimal marker; a lone dot is only a decimal point when one or two
//! digits follow it, otherwise dots are thousands separators.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::models::LineField;

/// Parse locale-ambiguous numeric text into a decimal.
///
/// Empty, blank or unparseable input yields zero; this never fails.
pub fn parse_decimal(raw: &str) -> Decimal {
    let s = raw.trim();
    if s.is_empty() {
        return Decimal::ZERO;
    }

    let normalized = if s.contains(',') {
        // Comma wins as the decimal marker; every dot is a thousands
        // separator.
        s.replace('.', "").replace(',', ".")
    } else {
        match s.matches('.').count() {
            0 => s.to_string(),
            1 => match s.split_once('.') {
                Some((_, frac))
                    if (1..=2).contains(&frac.len())
                        && frac.chars().all(|c| c.is_ascii_digit()) =>
                {
                    s.to_string()
                }
                _ => s.replace('.', ""),
            },
            // Multiple dots can only be thousands separators.
            _ => s.replace('.', ""),
        }
    };

    Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
}

/// Render a decimal with dot thousands grouping and a comma decimal marker.
///
/// At least two fraction digits are shown; extra stored precision (the
/// 4-decimal implied unit price) is preserved so that reparsing a formatted
/// value never loses information.
pub fn format_decimal(value: Decimal) -> String {
    let scale = value.normalize().scale().max(2);
    let fixed = format!("{:.*}", scale as usize, value);

    let negative = fixed.starts_with('-');
    let unsigned = fixed.trim_start_matches('-');
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!(
        "{}{},{}",
        if negative { "-" } else { "" },
        grouped,
        frac_part
    )
}

/// Per-field echo of what the user is currently typing.
///
/// While a field is focused the editor must display the literal keystrokes,
/// not the reformatted value, or the cursor jumps. The buffer is scoped to one
/// editor session and keyed by (row, field); blur clears the entry and the
/// formatted value takes over again.
#[derive(Debug, Clone, Default)]
pub struct EchoBuffer {
    live: HashMap<(usize, LineField), String>,
}

impl EchoBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the literal text of an in-progress edit.
    pub fn set(&mut self, row: usize, field: LineField, raw: &str) {
        self.live.insert((row, field), raw.to_string());
    }

    /// Field lost focus; revert to formatted display.
    pub fn clear(&mut self, row: usize, field: LineField) {
        self.live.remove(&(row, field));
    }

    /// Rows shifted (line added or removed); all echoes are stale.
    pub fn clear_all(&mut self) {
        self.live.clear();
    }

    /// What the field should show right now.
    pub fn display(&self, row: usize, field: LineField, value: Decimal) -> String {
        match self.live.get(&(row, field)) {
            Some(raw) => raw.clone(),
            None => format_decimal(value),
        }
    }
}
