//! Operator-facing outcome messages.

use curator_core::Tab;
use serde::Serialize;

/// Action run when the operator accepts a confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConfirmAction {
    /// Clear every product's slot on `tab`.
    ResetAll { tab: Tab },
}

/// A modal dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modal {
    Success {
        title: String,
        message: String,
    },
    Error {
        title: String,
        message: String,
    },
    Confirm {
        title: String,
        message: String,
        #[serde(flatten)]
        on_confirm: ConfirmAction,
    },
}

impl Modal {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Success {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn confirm(
        title: impl Into<String>,
        message: impl Into<String>,
        on_confirm: ConfirmAction,
    ) -> Self {
        Self::Confirm {
            title: title.into(),
            message: message.into(),
            on_confirm,
        }
    }
}

/// Holds at most one modal. Showing a new one replaces the current one.
#[derive(Debug, Clone, Default)]
pub struct ModalController {
    current: Option<Modal>,
}

impl ModalController {
    #[must_use]
    pub const fn current(&self) -> Option<&Modal> {
        self.current.as_ref()
    }

    pub fn show(&mut self, modal: Modal) {
        if let Some(previous) = self.current.replace(modal) {
            tracing::debug!(?previous, "Replacing open modal");
        }
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Close the modal and hand back its action if it was a confirmation.
    ///
    /// Any other modal is left open and `None` is returned.
    pub fn confirm(&mut self) -> Option<ConfirmAction> {
        match self.current.take() {
            Some(Modal::Confirm { on_confirm, .. }) => Some(on_confirm),
            other => {
                self.current = other;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_replaces_current() {
        let mut modals = ModalController::default();
        modals.show(Modal::success("Saved", "ok"));
        modals.show(Modal::error("Failed", "boom"));

        assert_eq!(modals.current(), Some(&Modal::error("Failed", "boom")));
    }

    #[test]
    fn test_confirm_returns_action_once() {
        let mut modals = ModalController::default();
        let action = ConfirmAction::ResetAll { tab: Tab::Latest };
        modals.show(Modal::confirm("Reset", "Sure?", action.clone()));

        assert_eq!(modals.confirm(), Some(action));
        assert!(modals.current().is_none());
        assert_eq!(modals.confirm(), None);
    }

    #[test]
    fn test_confirm_ignores_non_confirm_modal() {
        let mut modals = ModalController::default();
        modals.show(Modal::success("Saved", "ok"));

        assert_eq!(modals.confirm(), None);
        assert!(modals.current().is_some());

        modals.dismiss();
        assert!(modals.current().is_none());
    }

    #[test]
    fn test_modal_serializes_with_kind_tag() {
        let modal = Modal::confirm(
            "Reset",
            "Sure?",
            ConfirmAction::ResetAll { tab: Tab::Latest },
        );
        let json = serde_json::to_value(&modal).unwrap();

        assert_eq!(json["kind"], "confirm");
        assert_eq!(json["action"], "reset_all");
        assert_eq!(json["tab"], "latest");
    }
}
