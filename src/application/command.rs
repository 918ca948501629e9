use crate::domain::{Account, AccountId, Cents};

/// A single request against the ledger, as issued by the menu or a subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        holder: String,
        opening_balance: Cents,
    },
    Deposit {
        id: AccountId,
        amount: Cents,
    },
    Withdraw {
        id: AccountId,
        amount: Cents,
    },
    Search {
        id: AccountId,
    },
    ListAll,
}

/// Successful result of a [`Command`]. Accounts are snapshots taken after
/// the command was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(Account),
    Deposited { account: Account, amount: Cents },
    Withdrawn { account: Account, amount: Cents },
    Found(Account),
    Accounts(Vec<Account>),
    Empty,
}
