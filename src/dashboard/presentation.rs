//! Turns budget statuses into values ready for display.

use serde::Serialize;

use crate::{
    dashboard::aggregation::{BudgetStatus, BudgetTier},
    html::format_currency,
};

/// The colour used to draw a budget's progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
}

impl StatusColor {
    /// A CSS colour value for the colour.
    pub fn hex(&self) -> &'static str {
        match self {
            StatusColor::Green => "#34d399",
            StatusColor::Yellow => "#fbbf24",
            StatusColor::Red => "#f87171",
        }
    }
}

impl From<BudgetTier> for StatusColor {
    fn from(tier: BudgetTier) -> Self {
        match tier {
            BudgetTier::Ok => StatusColor::Green,
            BudgetTier::Warning => StatusColor::Yellow,
            BudgetTier::Critical => StatusColor::Red,
        }
    }
}

/// A budget status formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRecord {
    pub category_id: i64,
    pub category_name: &'static str,
    pub category_icon: &'static str,
    /// The amount spent as currency, e.g. "$450.00".
    pub spent: String,
    /// The budget limit as currency, e.g. "$500.00".
    pub limit: String,
    pub utilization_percent: f64,
    /// How much of the budget is left, as a percentage.
    pub remaining_percent: f64,
    pub color: StatusColor,
}

/// Format a budget status for display.
pub fn format_budget_status(status: &BudgetStatus) -> DisplayRecord {
    DisplayRecord {
        category_id: status.category.id(),
        category_name: status.category.name(),
        category_icon: status.category.icon(),
        spent: format_currency(status.spent),
        limit: format_currency(status.limit.as_f64()),
        utilization_percent: status.utilization_percent,
        remaining_percent: 100.0 - status.utilization_percent,
        color: status.tier.into(),
    }
}

/// The first `n` of `transactions`, which the caller has already sorted newest first.
pub fn recent_transactions<T>(transactions: &[T], n: usize) -> &[T] {
    &transactions[..n.min(transactions.len())]
}
