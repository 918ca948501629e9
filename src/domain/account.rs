use thiserror::Error;

use super::{format_cents, parse_stored_cents, Cents, ParseCentsError};

pub type AccountId = u32;

/// Balance floor: no account may be opened with, or withdrawn below, 1000.00.
pub const MIN_BALANCE: Cents = 100_000;

/// First identifier handed out by an empty ledger.
pub const FIRST_ACCOUNT_ID: AccountId = 1001;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error(
        "insufficient funds: balance {} must remain at least {}, at most {} can be withdrawn",
        money(.balance),
        format_cents(MIN_BALANCE),
        money(.max_withdrawal)
    )]
    InsufficientFunds { balance: Cents, max_withdrawal: Cents },

    #[error("balance overflow")]
    BalanceOverflow,
}

fn money(cents: &Cents) -> String {
    format_cents(*cents)
}

/// Why a persisted line could not be turned back into an account.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected 3 fields (id,holder,balance), found {0}")]
    FieldCount(usize),

    #[error("invalid account number '{0}'")]
    InvalidId(String),

    #[error("holder name is empty")]
    EmptyHolder,

    #[error("invalid balance: {0}")]
    InvalidBalance(#[from] ParseCentsError),

    #[error("malformed record: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub holder: String,
    pub balance: Cents,
}

impl Account {
    pub fn new(id: AccountId, holder: impl Into<String>, balance: Cents) -> Self {
        Self {
            id,
            holder: holder.into(),
            balance,
        }
    }

    /// Add `amount` to the balance and return the new balance.
    /// The caller guarantees `amount > 0`.
    pub fn credit(&mut self, amount: Cents) -> Result<Cents, AccountError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(AccountError::BalanceOverflow)?;
        Ok(self.balance)
    }

    /// Take `amount` from the balance unless that would leave less than
    /// [`MIN_BALANCE`]. On failure the balance is untouched.
    pub fn debit(&mut self, amount: Cents) -> Result<Cents, AccountError> {
        let remaining = self
            .balance
            .checked_sub(amount)
            .ok_or(AccountError::BalanceOverflow)?;
        if remaining < MIN_BALANCE {
            return Err(AccountError::InsufficientFunds {
                balance: self.balance,
                max_withdrawal: self.max_withdrawal(),
            });
        }
        self.balance = remaining;
        Ok(self.balance)
    }

    /// Largest amount `debit` would currently accept.
    pub fn max_withdrawal(&self) -> Cents {
        (self.balance - MIN_BALANCE).max(0)
    }

    /// Serialize as one `id,holder,balance` line (no terminator).
    /// Holders containing commas or quotes are quoted.
    pub fn encode(&self) -> Result<String, RecordError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record([
            self.id.to_string(),
            self.holder.clone(),
            format_cents(self.balance),
        ])?;
        let bytes = writer
            .into_inner()
            .map_err(|e| RecordError::Csv(csv::Error::from(e.into_error())))?;
        let line = String::from_utf8_lossy(&bytes);
        Ok(line.trim_end_matches('\n').to_string())
    }

    /// Parse a line produced by [`Account::encode`]. Fields are trimmed.
    pub fn decode(line: &str) -> Result<Self, RecordError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(line.as_bytes());

        let record = match reader.records().next() {
            Some(record) => record?,
            None => return Err(RecordError::FieldCount(0)),
        };
        if record.len() != 3 {
            return Err(RecordError::FieldCount(record.len()));
        }

        let id = match record[0].parse::<AccountId>() {
            Ok(id) if id > 0 => id,
            _ => return Err(RecordError::InvalidId(record[0].to_string())),
        };
        let holder = &record[1];
        if holder.is_empty() {
            return Err(RecordError::EmptyHolder);
        }
        let balance = parse_stored_cents(&record[2])?;

        Ok(Self::new(id, holder, balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_adds_amount() {
        let mut account = Account::new(1001, "Alice", 150_000);
        assert_eq!(account.credit(50_000), Ok(200_000));
        assert_eq!(account.balance, 200_000);
    }

    #[test]
    fn test_credit_overflow_leaves_balance() {
        let mut account = Account::new(1001, "Alice", Cents::MAX - 10);
        assert_eq!(account.credit(11), Err(AccountError::BalanceOverflow));
        assert_eq!(account.balance, Cents::MAX - 10);
    }

    #[test]
    fn test_debit_below_minimum_is_rejected() {
        let mut account = Account::new(1001, "Alice", 150_000);
        let err = account.debit(60_000).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                balance: 150_000,
                max_withdrawal: 50_000,
            }
        );
        assert_eq!(account.balance, 150_000);
    }

    #[test]
    fn test_debit_down_to_minimum_is_allowed() {
        let mut account = Account::new(1001, "Alice", 150_000);
        assert_eq!(account.debit(50_000), Ok(MIN_BALANCE));
        assert_eq!(account.max_withdrawal(), 0);
    }

    #[test]
    fn test_insufficient_funds_message_mentions_limit() {
        let mut account = Account::new(1001, "Alice", 150_000);
        let message = account.debit(60_000).unwrap_err().to_string();
        assert!(message.contains("500.00"), "{message}");
        assert!(message.contains("at least 1000.00"), "{message}");
    }

    #[test]
    fn test_encode_format() {
        let account = Account::new(1001, "Bob", 500_000);
        assert_eq!(account.encode().unwrap(), "1001,Bob,5000.00");
    }

    #[test]
    fn test_roundtrip_plain_and_quoted_holders() {
        for holder in ["Alice", "Smith, John", "Ann \"Nan\" Lee"] {
            let account = Account::new(1042, holder, 123_456);
            let line = account.encode().unwrap();
            assert_eq!(Account::decode(&line).unwrap(), account, "line: {line}");
        }
    }

    #[test]
    fn test_decode_trims_and_accepts_loose_decimals() {
        let account = Account::decode(" 1001 , Bob ,5000 ").unwrap();
        assert_eq!(account, Account::new(1001, "Bob", 500_000));

        // A balance written with a single decimal place
        let account = Account::decode("1002,Carol,1500.0").unwrap();
        assert_eq!(account.balance, 150_000);
    }

    #[test]
    fn test_decode_rounds_float_balances_to_cents() {
        let account = Account::decode("1001,Bob,1999.9999999999998").unwrap();
        assert_eq!(account.balance, 200_000);

        let account = Account::decode("1002,Carol,1.0E7").unwrap();
        assert_eq!(account.balance, 1_000_000_000);
    }

    #[test]
    fn test_decode_rejects_wrong_field_count() {
        assert!(matches!(
            Account::decode("1001,Bob"),
            Err(RecordError::FieldCount(2))
        ));
        assert!(matches!(
            Account::decode("1001,Smith,John,5000"),
            Err(RecordError::FieldCount(4))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_numbers() {
        assert!(matches!(
            Account::decode("abc,Bob,5000"),
            Err(RecordError::InvalidId(_))
        ));
        assert!(matches!(
            Account::decode("0,Bob,5000"),
            Err(RecordError::InvalidId(_))
        ));
        assert!(matches!(
            Account::decode("1001,Bob,lots"),
            Err(RecordError::InvalidBalance(_))
        ));
        assert!(matches!(
            Account::decode("1001, ,5000"),
            Err(RecordError::EmptyHolder)
        ));
    }
}
