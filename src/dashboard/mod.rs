//! Dashboard module
//!
//! Provides an overview page with income and expense totals, the latest
//! transactions and how much of each budget has been spent.

mod aggregation;
mod cards;
mod handlers;
mod presentation;

pub use aggregation::{
    AggregateSummary, BudgetStatus, BudgetTier, compute_budget_statuses, compute_summary,
};
pub use handlers::{get_dashboard_api, get_dashboard_page};
pub use presentation::{DisplayRecord, StatusColor, format_budget_status, recent_transactions};
