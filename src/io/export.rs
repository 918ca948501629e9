use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::LedgerService;
use crate::domain::{format_cents, Account, AccountId};

/// One exported account. Balances are two-decimal strings so no precision
/// is lost to floating point on the consumer side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRow {
    pub id: AccountId,
    pub holder: String,
    pub balance: String,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            holder: account.holder.clone(),
            balance: format_cents(account.balance),
        }
    }
}

/// Ledger snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<AccountRow>,
}

/// Exporter for converting ledger data to various formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    fn rows(&self) -> Vec<AccountRow> {
        self.service
            .list_all()
            .unwrap_or_default()
            .iter()
            .map(AccountRow::from)
            .collect()
    }

    /// Export accounts to CSV with an `id,holder,balance` header row.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let rows = self.rows();
        let mut csv_writer = csv::Writer::from_writer(writer);

        if rows.is_empty() {
            // serialize() only emits the header alongside the first row
            csv_writer.write_record(["id", "holder", "balance"])?;
        }
        for row in &rows {
            csv_writer.serialize(row)?;
        }

        csv_writer.flush()?;
        Ok(rows.len())
    }

    /// Export accounts to a pretty-printed JSON snapshot.
    pub fn export_json<W: Write>(&self, writer: W) -> Result<usize> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            accounts: self.rows(),
        };
        let count = snapshot.accounts.len();
        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Repository;
    use tempfile::TempDir;

    fn service_with_accounts(dir: &TempDir) -> LedgerService {
        let mut service = LedgerService::new(Repository::new(dir.path().join("bank_data.txt")));
        service.create("Alice", 150_000).unwrap();
        service.create("Smith, John", 275_050).unwrap();
        service
    }

    #[test]
    fn test_export_csv() {
        let dir = TempDir::new().unwrap();
        let service = service_with_accounts(&dir);

        let mut out = Vec::new();
        let count = Exporter::new(&service).export_csv(&mut out).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,holder,balance\n1001,Alice,1500.00\n1002,\"Smith, John\",2750.50\n"
        );
    }

    #[test]
    fn test_export_csv_empty_ledger_has_header() {
        let dir = TempDir::new().unwrap();
        let service = LedgerService::new(Repository::new(dir.path().join("bank_data.txt")));

        let mut out = Vec::new();
        let count = Exporter::new(&service).export_csv(&mut out).unwrap();

        assert_eq!(count, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "id,holder,balance\n");
    }

    #[test]
    fn test_export_json() {
        let dir = TempDir::new().unwrap();
        let service = service_with_accounts(&dir);

        let mut out = Vec::new();
        Exporter::new(&service).export_json(&mut out).unwrap();

        let snapshot: LedgerSnapshot = serde_json::from_slice(&out).unwrap();
        assert_eq!(snapshot.accounts.len(), 2);
        assert_eq!(
            snapshot.accounts[1],
            AccountRow {
                id: 1002,
                holder: "Smith, John".to_string(),
                balance: "2750.50".to_string(),
            }
        );
    }
}
