//! Validation primitives shared by every view type

use serde::{Deserialize, Serialize};
use std::fmt;

/// One violated domain rule
///
/// The message is written for the model, not for a log reader: it is fed back
/// verbatim into the next prompt's error scratchpad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON path of the offending field (e.g. `item.name`)
    pub field: String,

    /// Human-readable correction hint
    pub message: String,
}

impl Violation {
    /// Create a violation for the given field
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Join every violation into a single scratchpad line
///
/// # Examples
///
/// ```
/// use moneysaver_domain::{join_violations, Violation};
///
/// let text = join_violations(&[
///     Violation::new("amount", "amount should be greater than 0"),
///     Violation::new("item.name", "item name can not be empty"),
/// ]);
/// assert_eq!(text, "amount should be greater than 0; item name can not be empty");
/// ```
pub fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message_only() {
        let v = Violation::new("amount", "amount can not be negative");
        assert_eq!(v.to_string(), "amount can not be negative");
        assert_eq!(v.field, "amount");
    }

    #[test]
    fn test_join_empty() {
        assert_eq!(join_violations(&[]), "");
    }
}
