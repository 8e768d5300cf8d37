//! Card components for the dashboard: totals, recent transactions and budgets.

use maud::{Markup, html};

use crate::{
    category::lookup_category,
    dashboard::{
        aggregation::{AggregateSummary, BudgetStatus},
        presentation::StatusColor,
    },
    endpoints,
    html::{CARD_STYLE, LINK_STYLE, format_currency, format_currency_rounded, progress_bar},
    transaction::{Transaction, amount_class, category_label, format_signed_amount},
};

pub(super) const NO_TRANSACTIONS_MSG: &str = "No transactions found.";
pub(super) const NO_BUDGETS_MSG: &str = "No budgets set.";

fn summary_card(title: &str, icon: &str, amount: f64, amount_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) data-summary-card=(title)
        {
            div class="flex items-center justify-between"
            {
                h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
                i class={ "fas " (icon) " text-gray-400" } {}
            }

            p class={ "mt-2 text-2xl font-semibold tabular-nums " (amount_style) }
            {
                (format_currency(amount))
            }
        }
    }
}

/// Cards for total income, total expenses and the balance.
pub(super) fn summary_cards(summary: &AggregateSummary) -> Markup {
    let balance_style = if summary.balance < 0.0 {
        "text-red-700 dark:text-red-300"
    } else {
        "text-gray-900 dark:text-white"
    };

    html! {
        div class="grid grid-cols-1 gap-4 md:grid-cols-3"
        {
            (summary_card("Income", "fa-arrow-down", summary.total_income, "text-green-700 dark:text-green-300"))
            (summary_card("Expenses", "fa-arrow-up", summary.total_expense, "text-red-700 dark:text-red-300"))
            (summary_card("Balance", "fa-wallet", summary.balance, balance_style))
        }
    }
}

/// A short list of the latest transactions with a link to the full list.
pub(super) fn recent_transactions_card(transactions: &[Transaction]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            div class="flex items-center justify-between mb-4"
            {
                h2 class="text-lg font-semibold" { "Recent Transactions" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            @if transactions.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { (NO_TRANSACTIONS_MSG) }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for transaction in transactions {
                        li class="flex items-center justify-between py-3" data-recent-transaction
                        {
                            div
                            {
                                p class="font-medium" { (category_label(lookup_category(transaction.category_id))) }
                                p class="text-sm text-gray-500 dark:text-gray-400"
                                {
                                    (transaction.date)
                                    @if let Some(description) = &transaction.description {
                                        " · " (description)
                                    }
                                }
                            }

                            span class={ "tabular-nums " (amount_class(transaction.kind)) }
                            {
                                (format_signed_amount(transaction.kind, transaction.amount))
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A compact list of budgets: name, rounded spending against the limit, and a progress bar.
pub(super) fn budgets_card(statuses: &[BudgetStatus]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            div class="flex items-center justify-between mb-4"
            {
                h2 class="text-lg font-semibold" { "Budgets" }
                a href=(endpoints::BUDGETS_VIEW) class=(LINK_STYLE) { "Manage" }
            }

            @if statuses.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { (NO_BUDGETS_MSG) }
            } @else {
                ul class="space-y-4"
                {
                    @for status in statuses {
                        li data-budget-status
                        {
                            div class="flex justify-between text-sm mb-1"
                            {
                                span class="font-medium" { (status.category.name()) }
                                span class="tabular-nums text-gray-500 dark:text-gray-400"
                                {
                                    (format_currency_rounded(status.spent))
                                    " / "
                                    (format_currency_rounded(status.limit.as_f64()))
                                }
                            }

                            (progress_bar(status.utilization_percent, StatusColor::from(status.tier).hex()))
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        auth::UserID,
        budget::BudgetLimit,
        category::lookup_category,
        dashboard::aggregation::{AggregateSummary, BudgetStatus, BudgetTier, compute_summary},
        test_utils::assert_valid_html,
        transaction::{Transaction, TransactionKind},
    };

    use super::{
        NO_BUDGETS_MSG, NO_TRANSACTIONS_MSG, budgets_card, recent_transactions_card,
        summary_cards,
    };

    #[test]
    fn summary_cards_show_totals() {
        let html = summary_cards(&AggregateSummary {
            total_income: 5000.0,
            total_expense: 3000.0,
            balance: 2000.0,
        })
        .into_string();
        let fragment = Html::parse_fragment(&html);
        assert_valid_html(&fragment);

        let amounts: Vec<String> = fragment
            .select(&Selector::parse("[data-summary-card] p").unwrap())
            .map(|p| p.text().collect())
            .collect();
        assert_eq!(amounts, ["$5,000.00", "$3,000.00", "$2,000.00"]);
    }

    #[test]
    fn balance_that_cancels_out_shows_zero() {
        let transaction = |kind, amount| Transaction {
            id: 1,
            user_id: UserID::new(1),
            category_id: 1,
            amount,
            kind,
            date: date!(2025 - 05 - 01),
            description: None,
        };
        let summary = compute_summary(&[
            transaction(TransactionKind::Income, 0.3),
            transaction(TransactionKind::Expense, 0.1),
            transaction(TransactionKind::Expense, 0.2),
        ]);

        let html = summary_cards(&summary).into_string();
        let fragment = Html::parse_fragment(&html);
        let amounts: Vec<String> = fragment
            .select(&Selector::parse("[data-summary-card] p").unwrap())
            .map(|p| p.text().collect())
            .collect();

        assert_eq!(amounts, ["$0.30", "$0.30", "$0.00"]);
    }

    #[test]
    fn empty_states() {
        let transactions = recent_transactions_card(&[]).into_string();
        let budgets = budgets_card(&[]).into_string();

        assert!(transactions.contains(NO_TRANSACTIONS_MSG));
        assert!(budgets.contains(NO_BUDGETS_MSG));
    }

    #[test]
    fn recent_transaction_shows_category_and_signed_amount() {
        let html = recent_transactions_card(&[Transaction {
            id: 1,
            user_id: UserID::new(1),
            category_id: 5,
            amount: 1500.0,
            kind: TransactionKind::Expense,
            date: date!(2025 - 05 - 01),
            description: Some("May rent".to_owned()),
        }])
        .into_string();

        assert!(html.contains("Rent"));
        assert!(html.contains("fa-home"));
        assert!(html.contains("-$1,500.00"));
        assert!(html.contains("May rent"));
    }

    #[test]
    fn budget_shows_rounded_amounts_and_tier_color() {
        let html = budgets_card(&[BudgetStatus {
            category: lookup_category(4),
            spent: 449.6,
            limit: BudgetLimit::new_unchecked(500.0),
            utilization_percent: 89.92,
            tier: BudgetTier::Warning,
        }])
        .into_string();

        assert!(html.contains("$450 / $500"));
        assert!(html.contains("#fbbf24"));
    }
}
