//! The static catalog of categories used to classify transactions and budgets.
//!
//! Categories are shared, read-only data. Lookups never fail: an ID that is not
//! in the catalog produces [CategoryLookup::Unknown] so that callers decide how
//! to treat the dangling reference.

use axum::Json;
use serde::Serialize;

use crate::transaction::TransactionKind;

/// Alias for the integer type used for category IDs.
pub type CategoryId = i64;

/// A named classification for transactions, e.g., "Groceries".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    /// The ID that transactions and budgets use to refer to the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: &'static str,
    /// Whether the category tracks income or expenses.
    pub kind: TransactionKind,
    /// A Font Awesome icon class, e.g., "fa-home".
    pub icon: &'static str,
}

/// The name displayed for a category ID that is not in the catalog.
pub const UNKNOWN_CATEGORY_NAME: &str = "Unknown";
/// The icon displayed for a category ID that is not in the catalog.
pub const UNKNOWN_CATEGORY_ICON: &str = "fa-question";

/// Every category available to users.
pub static CATEGORIES: [Category; 9] = [
    Category {
        id: 1,
        name: "Salary",
        kind: TransactionKind::Income,
        icon: "fa-money-bill-wave",
    },
    Category {
        id: 2,
        name: "Freelance",
        kind: TransactionKind::Income,
        icon: "fa-laptop",
    },
    Category {
        id: 3,
        name: "Investment",
        kind: TransactionKind::Income,
        icon: "fa-chart-line",
    },
    Category {
        id: 4,
        name: "Groceries",
        kind: TransactionKind::Expense,
        icon: "fa-shopping-basket",
    },
    Category {
        id: 5,
        name: "Rent",
        kind: TransactionKind::Expense,
        icon: "fa-home",
    },
    Category {
        id: 6,
        name: "Utilities",
        kind: TransactionKind::Expense,
        icon: "fa-bolt",
    },
    Category {
        id: 7,
        name: "Entertainment",
        kind: TransactionKind::Expense,
        icon: "fa-film",
    },
    Category {
        id: 8,
        name: "Transportation",
        kind: TransactionKind::Expense,
        icon: "fa-bus",
    },
    Category {
        id: 9,
        name: "Health",
        kind: TransactionKind::Expense,
        icon: "fa-heartbeat",
    },
];

/// The result of looking up a category ID in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryLookup {
    /// The ID refers to a category in the catalog.
    Known(&'static Category),
    /// The ID does not refer to any category in the catalog.
    Unknown(CategoryId),
}

impl CategoryLookup {
    /// The category ID that was looked up.
    pub fn id(&self) -> CategoryId {
        match self {
            CategoryLookup::Known(category) => category.id,
            CategoryLookup::Unknown(id) => *id,
        }
    }

    /// The category name, or "Unknown" for IDs outside the catalog.
    pub fn name(&self) -> &'static str {
        match self {
            CategoryLookup::Known(category) => category.name,
            CategoryLookup::Unknown(_) => UNKNOWN_CATEGORY_NAME,
        }
    }

    /// The category icon, or a question mark for IDs outside the catalog.
    pub fn icon(&self) -> &'static str {
        match self {
            CategoryLookup::Known(category) => category.icon,
            CategoryLookup::Unknown(_) => UNKNOWN_CATEGORY_ICON,
        }
    }
}

/// Look up the category with `id` in the catalog.
pub fn lookup_category(id: CategoryId) -> CategoryLookup {
    CATEGORIES
        .iter()
        .find(|category| category.id == id)
        .map_or(CategoryLookup::Unknown(id), CategoryLookup::Known)
}

/// The categories that track `kind` transactions, in catalog order.
pub fn categories_of_kind(kind: TransactionKind) -> impl Iterator<Item = &'static Category> {
    CATEGORIES
        .iter()
        .filter(move |category| category.kind == kind)
}

/// Route handler that returns the category catalog as JSON.
pub async fn get_categories_api() -> Json<&'static [Category]> {
    Json(&CATEGORIES)
}
