//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered as HTML fragments that HTMX swaps into the alert
//! container at the bottom of every page.

use maud::{Markup, html};

/// A message to display to the user after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The action succeeded, with extra details.
    Success { message: String, details: String },
    /// The action succeeded and there is nothing else to say.
    SuccessSimple { message: String },
    /// The action failed, `details` should tell the user how to fix it.
    Error { message: String, details: String },
}

impl Alert {
    /// Render the alert as an out-of-band swap for the alert container.
    pub fn into_html(self) -> Markup {
        let (container_style, icon, message, details) = match self {
            Alert::Success { message, details } => (
                "text-green-800 border-green-300 bg-green-50 dark:bg-gray-800 \
                dark:text-green-400 dark:border-green-800",
                "fa-circle-check",
                message,
                details,
            ),
            Alert::SuccessSimple { message } => (
                "text-green-800 border-green-300 bg-green-50 dark:bg-gray-800 \
                dark:text-green-400 dark:border-green-800",
                "fa-circle-check",
                message,
                String::new(),
            ),
            Alert::Error { message, details } => (
                "text-red-800 border-red-300 bg-red-50 dark:bg-gray-800 \
                dark:text-red-400 dark:border-red-800",
                "fa-circle-exclamation",
                message,
                details,
            ),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div
                    role="alert"
                    class={"flex items-start gap-3 p-4 mb-4 border rounded-lg " (container_style)}
                {
                    i class={"fas mt-1 " (icon)} {}

                    div class="flex-1"
                    {
                        p class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-auto bg-transparent"
                        aria-label="Close"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        i class="fas fa-xmark" {}
                    }
                }
            }
        }
    }
}
