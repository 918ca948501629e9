use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{format_cents, AccountId, Cents, RecordError};
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Account {0} not found")]
    AccountNotFound(AccountId),

    #[error(
        "Insufficient funds in account {id}: balance {}, at most {} can be withdrawn",
        money(.balance),
        money(.max_withdrawal)
    )]
    InsufficientFunds {
        id: AccountId,
        balance: Cents,
        max_withdrawal: Cents,
    },

    #[error("Balance of account {0} would overflow")]
    BalanceOverflow(AccountId),

    #[error("Corrupt record in {}, line {line}: {source}", .path.display())]
    CorruptRecord {
        path: PathBuf,
        line: usize,
        source: RecordError,
    },

    #[error("Duplicate account {id} in {}, line {line}", .path.display())]
    DuplicateAccount {
        path: PathBuf,
        line: usize,
        id: AccountId,
    },

    #[error("Could not access {}: {source}", .path.display())]
    Persistence { path: PathBuf, source: io::Error },
}

fn money(cents: &Cents) -> String {
    format_cents(*cents)
}

impl From<StorageError> for AppError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Read { path, source } | StorageError::Write { path, source } => {
                AppError::Persistence { path, source }
            }
            StorageError::Corrupt { path, line, source } => {
                AppError::CorruptRecord { path, line, source }
            }
            StorageError::DuplicateId { path, line, id } => {
                AppError::DuplicateAccount { path, line, id }
            }
            StorageError::Encode { path, id, source } => AppError::Persistence {
                path,
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("account {id}: {source}"),
                ),
            },
        }
    }
}
