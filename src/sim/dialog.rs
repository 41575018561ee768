//! Modal decision dialogs
//!
//! The simulation describes a dialog as plain data; the presentation layer
//! draws it and reports which button was pressed. Buttons carry an action
//! value instead of a callback, and choosing one hides the dialog before the
//! action is handed back, so an action that opens a new dialog never stacks
//! on top of the old one.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogButton<A> {
    pub label: String,
    pub primary: bool,
    pub action: A,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dialog<A> {
    pub title: String,
    pub lines: Vec<String>,
    pub buttons: Vec<DialogButton<A>>,
}

impl<A> Dialog<A> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
            buttons: Vec::new(),
        }
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    pub fn lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn primary(mut self, label: impl Into<String>, action: A) -> Self {
        self.buttons.push(DialogButton {
            label: label.into(),
            primary: true,
            action,
        });
        self
    }

    pub fn button(mut self, label: impl Into<String>, action: A) -> Self {
        self.buttons.push(DialogButton {
            label: label.into(),
            primary: false,
            action,
        });
        self
    }

    /// Index of the primary button (Enter/Space default)
    pub fn primary_index(&self) -> Option<usize> {
        self.buttons.iter().position(|b| b.primary)
    }
}

/// The single modal slot a controller owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogSlot<A> {
    current: Option<Dialog<A>>,
}

impl<A> Default for DialogSlot<A> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<A: Clone> DialogSlot<A> {
    /// Show a dialog, replacing any visible one
    pub fn show(&mut self, dialog: Dialog<A>) {
        self.current = Some(dialog);
    }

    pub fn hide(&mut self) {
        self.current = None;
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Dialog<A>> {
        self.current.as_ref()
    }

    /// Press a button: hides the dialog and yields the button's action.
    ///
    /// Out-of-range indices leave the dialog up and yield nothing.
    pub fn choose(&mut self, index: usize) -> Option<A> {
        let action = self.current.as_ref()?.buttons.get(index)?.action.clone();
        self.current = None;
        Some(action)
    }

    /// Press the primary button
    pub fn choose_primary(&mut self) -> Option<A> {
        let index = self.current.as_ref()?.primary_index()?;
        self.choose(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Choice {
        Yes,
        No,
    }

    #[test]
    fn test_choose_hides_then_returns_action() {
        let mut slot = DialogSlot::default();
        slot.show(
            Dialog::new("Sure?")
                .line("Really?")
                .primary("Yes", Choice::Yes)
                .button("No", Choice::No),
        );
        assert!(slot.is_visible());
        assert_eq!(slot.current().map(|d| d.lines.len()), Some(1));

        assert_eq!(slot.choose(1), Some(Choice::No));
        assert!(!slot.is_visible());
        // One choice per show
        assert_eq!(slot.choose(0), None);
    }

    #[test]
    fn test_bad_index_keeps_dialog() {
        let mut slot = DialogSlot::default();
        slot.show(Dialog::new("Hi").primary("OK", Choice::Yes));
        assert_eq!(slot.choose(5), None);
        assert!(slot.is_visible());
        assert_eq!(slot.choose_primary(), Some(Choice::Yes));
    }
}
