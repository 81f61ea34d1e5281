//! Source/target pairs that make up an event's transition table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of an event's transition table.
///
/// Renders as `from -> to`, which is the form used in
/// [`Error::TransitionNotFound`](crate::runtime::Error::TransitionNotFound)
/// diagnostics.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Transition {
    pub from: String,
    pub to: String,
}

impl Transition {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Render a transition table as `[a -> b, c -> d]`.
pub(crate) fn format_transitions(transitions: &[Transition]) -> String {
    let entries: Vec<String> = transitions.iter().map(ToString::to_string).collect();
    format!("[{}]", entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_arrow() {
        assert_eq!(Transition::new("filled", "shipped").to_string(), "filled -> shipped");
    }

    #[test]
    fn table_keeps_declaration_order() {
        let table = vec![
            Transition::new("filled", "shipped"),
            Transition::new("empty", "shipped"),
        ];
        assert_eq!(
            format_transitions(&table),
            "[filled -> shipped, empty -> shipped]"
        );
        assert_eq!(format_transitions(&[]), "[]");
    }
}
