use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::domain::{
    format_cents, Account, AccountError, AccountId, Cents, FIRST_ACCOUNT_ID, MIN_BALANCE,
};
use crate::storage::Repository;

use super::{AppError, Command, Outcome};

/// Application service owning the in-memory ledger and its backing file.
/// This is the primary interface for any client (menu, subcommands, tests).
pub struct LedgerService {
    repo: Repository,
    accounts: Vec<Account>,
    next_id: AccountId,
}

/// What [`LedgerService::load`] found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSummary {
    /// No data file yet.
    Fresh,
    /// Number of accounts read from the data file.
    Loaded(usize),
}

impl LedgerService {
    /// Create an empty ledger bound to the given repository. Nothing is read.
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            accounts: Vec::new(),
            next_id: FIRST_ACCOUNT_ID,
        }
    }

    /// Bind to the data file at `path` and load it.
    pub fn open(path: impl Into<PathBuf>) -> Result<(Self, LoadSummary), AppError> {
        let mut service = Self::new(Repository::new(path));
        let summary = service.load()?;
        Ok((service, summary))
    }

    /// Identifier the next `create` will assign.
    pub fn next_id(&self) -> AccountId {
        self.next_id
    }

    // ========================
    // Persistence
    // ========================

    /// Replace the in-memory ledger with the contents of the data file.
    /// On error the current ledger is left as it was.
    pub fn load(&mut self) -> Result<LoadSummary, AppError> {
        let Some(accounts) = self.repo.load()? else {
            self.accounts.clear();
            self.next_id = FIRST_ACCOUNT_ID;
            return Ok(LoadSummary::Fresh);
        };

        self.next_id = accounts
            .iter()
            .map(|a| a.id.saturating_add(1))
            .fold(FIRST_ACCOUNT_ID, AccountId::max);
        self.accounts = accounts;

        debug!(count = self.accounts.len(), next_id = self.next_id, "ledger loaded");
        Ok(LoadSummary::Loaded(self.accounts.len()))
    }

    /// Rewrite the data file from the in-memory ledger.
    pub fn save(&self) -> Result<(), AppError> {
        self.repo.save(&self.accounts).map_err(|e| {
            warn!(error = %e, "failed to save ledger");
            AppError::from(e)
        })
    }

    // ========================
    // Account operations
    // ========================

    /// Open a new account. The holder name is trimmed.
    pub fn create(&mut self, holder: &str, opening_balance: Cents) -> Result<Account, AppError> {
        let holder = holder.trim();
        if holder.is_empty() {
            return Err(AppError::Validation("Name cannot be empty".to_string()));
        }
        if holder.contains(['\n', '\r']) {
            return Err(AppError::Validation(
                "Name cannot span multiple lines".to_string(),
            ));
        }
        if opening_balance < MIN_BALANCE {
            return Err(AppError::Validation(format!(
                "Opening deposit must be at least {}",
                format_cents(MIN_BALANCE)
            )));
        }

        let id = self.next_id;
        let next_id = id
            .checked_add(1)
            .filter(|_| self.find(id).is_none())
            .ok_or_else(|| AppError::Validation("No account numbers left to assign".to_string()))?;

        let account = Account::new(id, holder, opening_balance);
        self.accounts.push(account.clone());
        self.next_id = next_id;
        info!(id, balance = %format_cents(opening_balance), "account created");

        self.save()?;
        Ok(account)
    }

    /// Credit `amount` to an account.
    pub fn deposit(&mut self, id: AccountId, amount: Cents) -> Result<Account, AppError> {
        let account = self.find_mut(id)?;
        validate_amount(amount)?;

        account.credit(amount).map_err(|e| account_error(id, e))?;
        let snapshot = account.clone();
        info!(id, amount = %format_cents(amount), "deposit applied");

        self.save()?;
        Ok(snapshot)
    }

    /// Debit `amount` from an account, keeping at least [`MIN_BALANCE`].
    pub fn withdraw(&mut self, id: AccountId, amount: Cents) -> Result<Account, AppError> {
        let account = self.find_mut(id)?;
        validate_amount(amount)?;

        account.debit(amount).map_err(|e| account_error(id, e))?;
        let snapshot = account.clone();
        info!(id, amount = %format_cents(amount), "withdrawal applied");

        self.save()?;
        Ok(snapshot)
    }

    /// Look up an account by id.
    pub fn find(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// All accounts in creation order, or `None` when the ledger is empty.
    pub fn list_all(&self) -> Option<&[Account]> {
        if self.accounts.is_empty() {
            None
        } else {
            Some(self.accounts.as_slice())
        }
    }

    /// Run one [`Command`] and describe what happened.
    pub fn handle(&mut self, command: Command) -> Result<Outcome, AppError> {
        debug!(?command, "handling command");
        match command {
            Command::Create {
                holder,
                opening_balance,
            } => self.create(&holder, opening_balance).map(Outcome::Created),
            Command::Deposit { id, amount } => self
                .deposit(id, amount)
                .map(|account| Outcome::Deposited { account, amount }),
            Command::Withdraw { id, amount } => self
                .withdraw(id, amount)
                .map(|account| Outcome::Withdrawn { account, amount }),
            Command::Search { id } => self
                .find(id)
                .cloned()
                .map(Outcome::Found)
                .ok_or(AppError::AccountNotFound(id)),
            Command::ListAll => Ok(match self.list_all() {
                Some(accounts) => Outcome::Accounts(accounts.to_vec()),
                None => Outcome::Empty,
            }),
        }
    }

    fn find_mut(&mut self, id: AccountId) -> Result<&mut Account, AppError> {
        self.accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AppError::AccountNotFound(id))
    }
}

fn validate_amount(amount: Cents) -> Result<(), AppError> {
    if amount <= 0 {
        return Err(AppError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn account_error(id: AccountId, error: AccountError) -> AppError {
    match error {
        AccountError::InsufficientFunds {
            balance,
            max_withdrawal,
        } => AppError::InsufficientFunds {
            id,
            balance,
            max_withdrawal,
        },
        AccountError::BalanceOverflow => AppError::BalanceOverflow(id),
    }
}
