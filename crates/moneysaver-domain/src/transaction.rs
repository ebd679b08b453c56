//! Transaction module - the persisted record produced by an extraction

use crate::error::DomainError;
use crate::traits::ExtractionTarget;
use crate::user::UserId;
use crate::view::{TransactionItemView, TransactionView};
use std::fmt;

macro_rules! uuid_v7_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u128);

        impl $name {
            /// Generate a new UUIDv7-based identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().as_u128())
            }

            /// Create an identifier from a raw u128 value
            ///
            /// This is primarily for storage layer deserialization.
            pub fn from_value(value: u128) -> Self {
                Self(value)
            }

            /// Parse an identifier from its hyphenated string form
            pub fn parse(s: &str) -> Result<Self, DomainError> {
                uuid::Uuid::parse_str(s)
                    .map(|u| Self(u.as_u128()))
                    .map_err(|e| DomainError::InvalidId(e.to_string()))
            }

            /// Get the raw u128 value
            pub fn value(&self) -> u128 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", uuid::Uuid::from_u128(self.0))
            }
        }
    };
}

uuid_v7_id!(
    /// Unique identifier for a transaction
    ///
    /// UUIDv7 keeps identifiers sortable by creation time, which matches the
    /// order transactions are listed in.
    TransactionId
);

uuid_v7_id!(
    /// Unique identifier for the item attached to a transaction
    ItemId
);

/// Direction of money flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Money spent
    Expense,

    /// Money received, including savings deposits
    Revenue,
}

impl TransactionKind {
    /// Every declared kind, in the order they are offered to the model
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Expense, TransactionKind::Revenue];

    /// Get the kind as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Revenue => "revenue",
        }
    }

    /// Parse a kind from its exact wire string
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::UnknownVariant {
            kind: "transaction type",
            value: s.to_string(),
        })
    }
}

/// The item a transaction was spent on (or received for)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionItem {
    /// Unique identifier
    pub id: ItemId,

    /// Short item name, never empty
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Spending category (e.g. "food")
    pub category: String,
}

/// A persisted financial transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Owning user
    pub user_id: UserId,

    /// Expense or revenue
    pub kind: TransactionKind,

    /// Amount in whole currency units, strictly positive
    pub amount: i64,

    /// Linked item
    pub item: TransactionItem,

    /// When the transaction happened (unix seconds)
    pub recorded_at: u64,

    /// When this record was created (unix seconds)
    pub created_at: u64,

    /// When this record was last updated (unix seconds)
    pub updated_at: u64,
}

impl Transaction {
    /// Build a persistable record from a validated view
    ///
    /// The view is validated again here so a record can never be assembled
    /// from a view that skipped the extraction engine.
    ///
    /// # Examples
    ///
    /// ```
    /// use moneysaver_domain::{Transaction, TransactionKind, TransactionView, UserId};
    ///
    /// let view = TransactionView::new("expense", 12, "lunch");
    /// let tx = Transaction::assemble(UserId(7), &view).unwrap();
    /// assert_eq!(tx.kind, TransactionKind::Expense);
    /// assert_eq!(tx.amount, 12);
    /// assert_eq!(tx.item.name, "lunch");
    /// ```
    pub fn assemble(owner: UserId, view: &TransactionView) -> Result<Self, DomainError> {
        let violations = view.validate();
        if !violations.is_empty() {
            return Err(DomainError::InvalidView(violations));
        }

        let kind = view.transaction_type.parse::<TransactionKind>()?;
        let item = view.item.clone().unwrap_or_default();
        let now = crate::unix_now();

        Ok(Self {
            id: TransactionId::new(),
            user_id: owner,
            kind,
            amount: view.amount,
            item: TransactionItem {
                id: ItemId::new(),
                name: item.name,
                description: item.description,
                category: item.category,
            },
            recorded_at: now,
            created_at: now,
            updated_at: now,
        })
    }

    /// Render this record back into its caller-facing view
    pub fn view(&self) -> TransactionView {
        TransactionView {
            id: Some(self.id.to_string()),
            transaction_type: self.kind.as_str().to_string(),
            amount: self.amount,
            item: Some(TransactionItemView {
                name: self.item.name.clone(),
                description: self.item.description.clone(),
                category: self.item.category.clone(),
            }),
        }
    }
}
