//! MoneySaver Storage Layer
//!
//! Implements the `TransactionStore` trait on SQLite.
//!
//! # Architecture
//!
//! - `users`: one row per account, unique user name and email
//! - `transactions`: owned by a user, removed with it (`ON DELETE CASCADE`)
//! - `transaction_items`: exactly one per transaction, removed with it
//!
//! # Examples
//!
//! ```no_run
//! use moneysaver_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for user and transaction operations
//! ```

#![warn(missing_docs)]

use moneysaver_domain::{
    ItemId, NewUser, Platform, Role, Transaction, TransactionId, TransactionItem, TransactionKind,
    TransactionStore, User, UserId,
};
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A referenced row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A unique column already holds this value
    #[error("Duplicate: {0}")]
    Duplicate(String),
}

/// Which constraint a failed statement tripped, if any
fn constraint_kind(e: &rusqlite::Error) -> Option<i32> {
    match e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == rusqlite::ErrorCode::ConstraintViolation => {
            Some(err.extended_code)
        }
        _ => None,
    }
}

/// SQLite-based implementation of TransactionStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share one store behind a `Mutex`,
/// or give each thread its own instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use moneysaver_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("moneysaver.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert an id value to bytes for storage
    fn id_to_bytes(value: u128) -> Vec<u8> {
        value.to_be_bytes().to_vec()
    }

    /// Convert stored bytes back to an id value
    fn bytes_to_id(bytes: &[u8]) -> Result<u128, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!("Expected 16 bytes for id, got {}", bytes.len()))
        })?;
        Ok(u128::from_be_bytes(arr))
    }

    /// Wrap a store-level conversion error for use inside a row mapper
    fn conversion_error(column: usize, e: StoreError) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    }

    fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        let role: String = row.get(3)?;
        let platform: String = row.get(4)?;

        Ok(User {
            id: UserId(row.get(0)?),
            user_name: row.get(1)?,
            email: row.get(2)?,
            role: Role::parse(&role)
                .ok_or_else(|| Self::conversion_error(3, StoreError::InvalidData(format!("Unknown role: {}", role))))?,
            platform: Platform::parse(&platform).ok_or_else(|| {
                Self::conversion_error(4, StoreError::InvalidData(format!("Unknown platform: {}", platform)))
            })?,
            external_id: row.get(5)?,
            created_at: row.get::<_, i64>(6)? as u64,
        })
    }

    fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_id(&id_bytes).map_err(|e| Self::conversion_error(0, e))?;

        let kind: String = row.get(2)?;
        let kind = TransactionKind::parse(&kind).ok_or_else(|| {
            Self::conversion_error(2, StoreError::InvalidData(format!("Unknown transaction type: {}", kind)))
        })?;

        let item_bytes: Vec<u8> = row.get(7)?;
        let item_id = Self::bytes_to_id(&item_bytes).map_err(|e| Self::conversion_error(7, e))?;

        Ok(Transaction {
            id: TransactionId::from_value(id),
            user_id: UserId(row.get(1)?),
            kind,
            amount: row.get(3)?,
            item: TransactionItem {
                id: ItemId::from_value(item_id),
                name: row.get(8)?,
                description: row.get(9)?,
                category: row.get(10)?,
            },
            recorded_at: row.get::<_, i64>(4)? as u64,
            created_at: row.get::<_, i64>(5)? as u64,
            updated_at: row.get::<_, i64>(6)? as u64,
        })
    }

    /// Look a user up by identifier
    pub fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let user = self
            .conn
            .query_row(
                "SELECT id, user_name, email, role, platform, external_id, created_at
                 FROM users WHERE id = ?1",
                params![id.0],
                Self::user_from_row,
            )
            .optional()?;
        Ok(user)
    }
}

impl TransactionStore for SqliteStore {
    type Error = StoreError;

    fn create_user(&mut self, user: NewUser) -> Result<User, Self::Error> {
        let created_at = moneysaver_domain::unix_now();

        self.conn
            .execute(
                "INSERT INTO users (user_name, email, role, platform, external_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    &user.user_name,
                    &user.email,
                    user.role.as_str(),
                    user.platform.as_str(),
                    &user.external_id,
                    created_at as i64,
                ],
            )
            .map_err(|e| match constraint_kind(&e) {
                Some(ffi::SQLITE_CONSTRAINT_UNIQUE) => {
                    StoreError::Duplicate(format!("user '{}' or email '{}'", user.user_name, user.email))
                }
                _ => StoreError::Database(e),
            })?;

        let id = UserId(self.conn.last_insert_rowid());
        debug!("created user {} ({})", user.user_name, id.0);

        Ok(User {
            id,
            user_name: user.user_name,
            email: user.email,
            role: user.role,
            platform: user.platform,
            external_id: user.external_id,
            created_at,
        })
    }

    fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>, Self::Error> {
        let user = self
            .conn
            .query_row(
                "SELECT id, user_name, email, role, platform, external_id, created_at
                 FROM users WHERE user_name = ?1",
                params![user_name],
                Self::user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn delete_user(&mut self, id: UserId) -> Result<bool, Self::Error> {
        // Transactions and their items go with the user via ON DELETE CASCADE
        let deleted = self.conn.execute("DELETE FROM users WHERE id = ?1", params![id.0])?;
        Ok(deleted > 0)
    }

    fn create_transaction(&mut self, transaction: &Transaction) -> Result<TransactionId, Self::Error> {
        let id_bytes = Self::id_to_bytes(transaction.id.value());
        let item_bytes = Self::id_to_bytes(transaction.item.id.value());

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO transactions (id, user_id, transaction_type, amount, recorded_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &id_bytes,
                transaction.user_id.0,
                transaction.kind.as_str(),
                transaction.amount,
                transaction.recorded_at as i64,
                transaction.created_at as i64,
                transaction.updated_at as i64,
            ],
        )
        .map_err(|e| match constraint_kind(&e) {
            Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => {
                StoreError::NotFound(format!("user {}", transaction.user_id.0))
            }
            Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
                StoreError::Duplicate(format!("transaction {}", transaction.id))
            }
            Some(ffi::SQLITE_CONSTRAINT_CHECK) => {
                StoreError::InvalidData(format!("transaction {} violates a check", transaction.id))
            }
            _ => StoreError::Database(e),
        })?;

        tx.execute(
            "INSERT INTO transaction_items (id, transaction_id, name, description, category)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &item_bytes,
                &id_bytes,
                &transaction.item.name,
                &transaction.item.description,
                &transaction.item.category,
            ],
        )?;

        tx.commit()?;
        debug!("stored transaction {} for user {}", transaction.id, transaction.user_id.0);

        Ok(transaction.id)
    }

    fn list_transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.user_id, t.transaction_type, t.amount, t.recorded_at, t.created_at, t.updated_at,
                    i.id, i.name, i.description, i.category
             FROM transactions t
             JOIN transaction_items i ON i.transaction_id = t.id
             WHERE t.user_id = ?1
             ORDER BY t.created_at, t.rowid",
        )?;

        let transactions = stmt
            .query_map(params![user_id.0], Self::transaction_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_bytes_round_trip() {
        let id = TransactionId::new();
        let bytes = SqliteStore::id_to_bytes(id.value());
        assert_eq!(bytes.len(), 16);
        assert_eq!(SqliteStore::bytes_to_id(&bytes).unwrap(), id.value());
    }

    #[test]
    fn test_bytes_to_id_wrong_length() {
        let result = SqliteStore::bytes_to_id(&[1, 2, 3]);
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let store = SqliteStore::new(":memory:").unwrap();
        let enabled: i64 = store
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_find_user_by_id() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let user = store.create_user(NewUser::new("alice", "alice@example.com")).unwrap();

        assert_eq!(store.find_user(user.id).unwrap(), Some(user));
        assert_eq!(store.find_user(UserId(999)).unwrap(), None);
    }
}
