//! Views - the loosely-typed shapes an LLM is asked to fill in
//!
//! Views deliberately keep enum-like fields as plain strings and default every
//! missing field. That way a model answer with an unknown transaction type or
//! a dropped field still decodes, and the validator can tell the model exactly
//! what to fix instead of failing on a parse error.

use crate::traits::ExtractionTarget;
use crate::transaction::TransactionKind;
use crate::validation::Violation;
use serde::{Deserialize, Serialize};

const TRANSACTION_GUIDANCE: &str = "Potential value for 'transaction_type' key is either 'expense' or 'revenue', \
please enter one of them exactly. Most records are expenses; deposits into bank or personal savings are revenue. \
'amount' must be a whole number greater than 0 taken from the prompt. \
'item.name' is a short name of what the money was spent on or received for, and must not be empty. \
'item.category' is a one-word spending category such as 'food', 'transport' or 'salary'.";

const ACTION_GUIDANCE: &str = "Potential value for 'action_type' key is 'AddTransaction', 'Reporting' or 'Unclear'. \
Use 'AddTransaction' when the user records a new expense or revenue (for example \"Add a $50 expense for groceries\"). \
Use 'Reporting' when the user asks for a summary or history of past transactions \
(for example \"Show me the transaction history for last month\"). \
Use 'Unclear' for anything else.";

/// The item part of a [`TransactionView`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionItemView {
    /// Item name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Spending category
    pub category: String,
}

/// Caller-facing shape of a transaction
///
/// `TransactionView::default()` is the empty skeleton handed to the model: it
/// carries an empty item so the schema shows the nested fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionView {
    /// Identifier of the persisted record; absent until assembled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// `expense` or `revenue`
    pub transaction_type: String,

    /// Amount in whole currency units
    pub amount: i64,

    /// What the money was spent on or received for
    pub item: Option<TransactionItemView>,
}

impl Default for TransactionView {
    fn default() -> Self {
        Self {
            id: None,
            transaction_type: String::new(),
            amount: 0,
            item: Some(TransactionItemView::default()),
        }
    }
}

impl TransactionView {
    /// Convenience constructor with an item that only has a name
    pub fn new(transaction_type: impl Into<String>, amount: i64, item_name: impl Into<String>) -> Self {
        Self {
            id: None,
            transaction_type: transaction_type.into(),
            amount,
            item: Some(TransactionItemView {
                name: item_name.into(),
                ..TransactionItemView::default()
            }),
        }
    }

    /// The parsed kind, if `transaction_type` names a declared one
    pub fn kind(&self) -> Option<TransactionKind> {
        TransactionKind::parse(&self.transaction_type)
    }
}

impl ExtractionTarget for TransactionView {
    fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        match &self.item {
            None => violations.push(Violation::new("item", "item can not be null")),
            Some(item) if item.name.trim().is_empty() => violations.push(Violation::new(
                "item.name",
                "item name can not be empty, please insert a valid string",
            )),
            Some(_) => {}
        }

        if self.amount <= 0 {
            violations.push(Violation::new(
                "amount",
                "amount should be greater than 0, extract from the prompt",
            ));
        }

        if self.kind().is_none() {
            violations.push(Violation::new(
                "transaction_type",
                format!(
                    "invalid transaction type: '{}', expected one of 'expense', 'revenue'",
                    self.transaction_type
                ),
            ));
        }

        violations
    }

    fn guidance(&self) -> &str {
        TRANSACTION_GUIDANCE
    }
}

/// What the user wants the assistant to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssistantActionType {
    /// Record a new expense or revenue
    AddTransaction,

    /// Summarise past transactions
    Reporting,

    /// Nothing recognisable
    Unclear,
}

impl AssistantActionType {
    /// Get the action name as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            AssistantActionType::AddTransaction => "AddTransaction",
            AssistantActionType::Reporting => "Reporting",
            AssistantActionType::Unclear => "Unclear",
        }
    }

    /// Parse an action from its exact wire string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AddTransaction" => Some(AssistantActionType::AddTransaction),
            "Reporting" => Some(AssistantActionType::Reporting),
            "Unclear" => Some(AssistantActionType::Unclear),
            _ => None,
        }
    }
}

/// Classification of a free-text request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantActionView {
    /// `AddTransaction`, `Reporting` or `Unclear`
    pub action_type: String,
}

impl AssistantActionView {
    /// The parsed action, if `action_type` names a declared one
    pub fn action(&self) -> Option<AssistantActionType> {
        AssistantActionType::parse(&self.action_type)
    }
}

impl ExtractionTarget for AssistantActionView {
    fn validate(&self) -> Vec<Violation> {
        if self.action().is_some() {
            return Vec::new();
        }
        vec![Violation::new(
            "action_type",
            format!("invalid action type: '{}'", self.action_type),
        )]
    }

    fn guidance(&self) -> &str {
        ACTION_GUIDANCE
    }
}
