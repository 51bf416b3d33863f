pub mod editor;
pub mod ledger;
pub mod lifecycle;
pub mod metrics;
pub mod pricing;
pub mod settlement;
pub mod totals;

pub use editor::LineEditor;
pub use ledger::{HttpLedger, SettlementLedger};
pub use metrics::{get_metrics, init_metrics};
pub use totals::{DocumentTotals, TaxBreakdownEntry, TaxNames};
