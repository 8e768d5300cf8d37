//! Totals and budget utilization computed from a user's transactions.
//!
//! Everything here is pure: the callers load transactions and budgets from the
//! database and pass them in, nothing is cached or written back.

use serde::Serialize;

use crate::{
    budget::{Budget, BudgetLimit},
    category::{CategoryLookup, lookup_category},
    transaction::{Transaction, TransactionKind},
};

/// Utilization at or below this percentage is [BudgetTier::Ok].
const WARNING_THRESHOLD: f64 = 70.0;
/// Utilization above this percentage is [BudgetTier::Critical].
const CRITICAL_THRESHOLD: f64 = 90.0;

/// Income and expense totals over a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AggregateSummary {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expense: f64,
    /// Income minus expenses, negative when the user spent more than they earned.
    pub balance: f64,
}

/// How close spending is to a budget's limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    /// Utilization is 70% or less.
    Ok,
    /// Utilization is above 70% and at most 90%.
    Warning,
    /// Utilization is above 90%.
    Critical,
}

impl BudgetTier {
    /// The tier for a utilization percentage.
    pub fn from_utilization(utilization_percent: f64) -> Self {
        if utilization_percent <= WARNING_THRESHOLD {
            BudgetTier::Ok
        } else if utilization_percent <= CRITICAL_THRESHOLD {
            BudgetTier::Warning
        } else {
            BudgetTier::Critical
        }
    }
}

/// Spending against one budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetStatus {
    /// The category the budget applies to.
    pub category: CategoryLookup,
    /// The sum of all transactions in the category.
    pub spent: f64,
    /// The budget's limit.
    pub limit: BudgetLimit,
    /// `spent` as a percentage of `limit`, capped at 100.
    pub utilization_percent: f64,
    /// The status bucket for `utilization_percent`.
    pub tier: BudgetTier,
}

/// Sum the income and expenses in `transactions`.
pub fn compute_summary(transactions: &[Transaction]) -> AggregateSummary {
    let (total_income, total_expense) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expense), transaction| {
                match transaction.kind {
                    TransactionKind::Income => (income + transaction.amount, expense),
                    TransactionKind::Expense => (income, expense + transaction.amount),
                }
            });

    AggregateSummary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
    }
}

/// Compute the spending status of each budget, in the same order as `budgets`.
///
/// Spending for a budget is the sum of every transaction in its category,
/// regardless of date or kind.
pub fn compute_budget_statuses(
    budgets: &[Budget],
    transactions: &[Transaction],
) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .map(|budget| {
            let spent: f64 = transactions
                .iter()
                .filter(|transaction| transaction.category_id == budget.category_id)
                .map(|transaction| transaction.amount)
                .sum();

            let utilization_percent = (100.0 * spent / budget.limit.as_f64()).min(100.0);

            BudgetStatus {
                category: lookup_category(budget.category_id),
                spent,
                limit: budget.limit,
                utilization_percent,
                tier: BudgetTier::from_utilization(utilization_percent),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        auth::UserID,
        budget::{Budget, BudgetLimit},
        category::CategoryId,
        transaction::{Transaction, TransactionKind},
    };

    use super::{AggregateSummary, BudgetTier, compute_budget_statuses, compute_summary};

    fn transaction(
        id: i64,
        kind: TransactionKind,
        amount: f64,
        category_id: CategoryId,
    ) -> Transaction {
        Transaction {
            id,
            user_id: UserID::new(1),
            category_id,
            amount,
            kind,
            date: date!(2025 - 06 - 01),
            description: None,
        }
    }

    fn budget(category_id: CategoryId, limit: f64) -> Budget {
        Budget {
            id: category_id,
            user_id: UserID::new(1),
            category_id,
            limit: BudgetLimit::new(limit).unwrap(),
        }
    }

    #[test]
    fn summary_of_no_transactions_is_zero() {
        assert_eq!(
            compute_summary(&[]),
            AggregateSummary {
                total_income: 0.0,
                total_expense: 0.0,
                balance: 0.0
            }
        );
    }

    #[test]
    fn summary_splits_income_and_expenses() {
        let transactions = [
            transaction(1, TransactionKind::Income, 5000.0, 1),
            transaction(2, TransactionKind::Expense, 2000.0, 5),
            transaction(3, TransactionKind::Expense, 1000.0, 4),
        ];

        assert_eq!(
            compute_summary(&transactions),
            AggregateSummary {
                total_income: 5000.0,
                total_expense: 3000.0,
                balance: 2000.0
            }
        );
    }

    #[test]
    fn balance_is_income_minus_expense_for_any_order() {
        let mut transactions = vec![
            transaction(1, TransactionKind::Income, 1234.5, 1),
            transaction(2, TransactionKind::Expense, 99.25, 4),
            transaction(3, TransactionKind::Expense, 2000.0, 5),
            transaction(4, TransactionKind::Income, 0.75, 3),
            transaction(5, TransactionKind::Expense, 0.0, 7),
        ];
        let want = compute_summary(&transactions);

        for _ in 0..transactions.len() {
            transactions.rotate_left(1);
            let got = compute_summary(&transactions);

            assert_eq!(got.balance, got.total_income - got.total_expense);
            assert_eq!(got, want);
        }

        transactions.reverse();
        assert_eq!(compute_summary(&transactions), want);
    }

    #[test]
    fn balance_can_be_negative() {
        let transactions = [
            transaction(1, TransactionKind::Income, 100.0, 1),
            transaction(2, TransactionKind::Expense, 250.0, 5),
        ];

        assert_eq!(compute_summary(&transactions).balance, -150.0);
    }

    #[test]
    fn tier_boundaries() {
        let cases = [
            (0.0, BudgetTier::Ok),
            (70.0, BudgetTier::Ok),
            (70.0001, BudgetTier::Warning),
            (90.0, BudgetTier::Warning),
            (90.0001, BudgetTier::Critical),
            (100.0, BudgetTier::Critical),
        ];

        for (utilization, want) in cases {
            assert_eq!(
                BudgetTier::from_utilization(utilization),
                want,
                "wrong tier for {utilization}%"
            );
        }
    }

    #[test]
    fn spending_at_ninety_percent_is_a_warning() {
        let transactions = [
            transaction(1, TransactionKind::Expense, 200.0, 4),
            transaction(2, TransactionKind::Expense, 250.0, 4),
            transaction(3, TransactionKind::Expense, 1000.0, 5),
        ];

        let statuses = compute_budget_statuses(&[budget(4, 500.0)], &transactions);

        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].spent, 450.0);
        assert_eq!(statuses[0].utilization_percent, 90.0);
        assert_eq!(statuses[0].tier, BudgetTier::Warning);
    }

    #[test]
    fn overspending_is_capped_at_one_hundred_percent() {
        let transactions = [transaction(1, TransactionKind::Expense, 150.0, 7)];

        let statuses = compute_budget_statuses(&[budget(7, 100.0)], &transactions);

        assert_eq!(statuses[0].spent, 150.0);
        assert_eq!(statuses[0].utilization_percent, 100.0);
        assert_eq!(statuses[0].tier, BudgetTier::Critical);
    }

    #[test]
    fn utilization_stays_within_bounds() {
        let transactions = [
            transaction(1, TransactionKind::Expense, 0.01, 4),
            transaction(2, TransactionKind::Expense, 1e9, 5),
        ];
        let budgets = [
            budget(4, 1e9),
            budget(5, 0.01),
            budget(6, 50.0),
            budget(42, 10.0),
        ];

        for status in compute_budget_statuses(&budgets, &transactions) {
            assert!(
                (0.0..=100.0).contains(&status.utilization_percent),
                "utilization {} out of bounds",
                status.utilization_percent
            );
        }
    }

    #[test]
    fn statuses_keep_budget_order() {
        let budgets = [budget(8, 10.0), budget(4, 10.0), budget(6, 10.0)];

        let ids: Vec<_> = compute_budget_statuses(&budgets, &[])
            .iter()
            .map(|status| status.category.id())
            .collect();

        assert_eq!(ids, vec![8, 4, 6]);
    }

    #[test]
    fn spending_counts_every_transaction_in_the_category() {
        // An income transaction stored against an expense category still counts.
        let transactions = [
            transaction(1, TransactionKind::Expense, 30.0, 9),
            transaction(2, TransactionKind::Income, 20.0, 9),
        ];

        let statuses = compute_budget_statuses(&[budget(9, 100.0)], &transactions);

        assert_eq!(statuses[0].spent, 50.0);
        assert_eq!(statuses[0].tier, BudgetTier::Ok);
    }
}
