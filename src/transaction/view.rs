//! Markup shared by the pages that list transactions.

use maud::{Markup, html};

use crate::{
    category::{CategoryLookup, lookup_category},
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
    transaction::{Transaction, TransactionKind},
};

pub(crate) const NO_TRANSACTIONS_MSG: &str = "No transactions found.";

pub(crate) fn amount_class(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "text-green-700 dark:text-green-300",
        TransactionKind::Expense => "text-red-700 dark:text-red-300",
    }
}

/// Format `amount` with a plus sign for income and a minus sign for expenses,
/// e.g. "+$1,200.00" or "-$45.50".
pub(crate) fn format_signed_amount(kind: TransactionKind, amount: f64) -> String {
    let sign = match kind {
        TransactionKind::Income => '+',
        TransactionKind::Expense => '-',
    };

    format!("{sign}{}", format_currency(amount))
}

/// The category icon followed by its name.
pub(crate) fn category_label(category: CategoryLookup) -> Markup {
    html! {
        span class="inline-flex items-center gap-2"
        {
            i class={ "fas " (category.icon()) " w-4 text-center text-gray-500 dark:text-gray-400" } {}
            (category.name())
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let category = lookup_category(transaction.category_id);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE) { (category_label(category)) }
            td class=(TABLE_CELL_STYLE) { time datetime=(transaction.date) { (transaction.date) } }
            td class=(TABLE_CELL_STYLE)
            {
                @match &transaction.description {
                    Some(description) => { (description) }
                    None => { span class="text-gray-400 dark:text-gray-500" { "-" } }
                }
            }
            td class={ "px-6 py-4 text-right tabular-nums " (amount_class(transaction.kind)) }
            {
                (format_signed_amount(transaction.kind, transaction.amount))
            }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    hx-delete=(delete_url)
                    hx-confirm="Are you sure you want to delete this transaction? This cannot be undone."
                    hx-target="closest tr"
                    hx-target-error="#alert-container"
                    hx-swap="delete"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

/// A table of `transactions` in the order given, or a message if there are none.
pub(crate) fn transactions_table(transactions: &[Transaction]) -> Markup {
    html! {
        div class="relative w-full overflow-x-auto shadow-md rounded-lg"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class="px-6 py-3" { "Category" }
                        th scope="col" class="px-6 py-3" { "Date" }
                        th scope="col" class="px-6 py-3" { "Description" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class="px-6 py-3" { span class="sr-only" { "Actions" } }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction))
                    }

                    @if transactions.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="5" class="px-6 py-4 text-center" { (NO_TRANSACTIONS_MSG) }
                        }
                    }
                }
            }
        }
    }
}
