use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::domain::{Account, AccountId, RecordError};

/// File name used when the caller does not pick one.
pub const DEFAULT_DATA_FILE: &str = "bank_data.txt";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("{}, line {line}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        source: RecordError,
    },

    #[error("{}, line {line}: duplicate account number {id}", .path.display())]
    DuplicateId {
        path: PathBuf,
        line: usize,
        id: AccountId,
    },

    #[error("failed to encode account {id} for {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        id: AccountId,
        source: RecordError,
    },
}

/// Flat-file store for the ledger: a `#` header line followed by one
/// `id,holder,balance` line per account.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every account in file order.
    /// Returns `Ok(None)` when the file does not exist yet.
    pub fn load(&self) -> Result<Option<Vec<Account>>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "data file absent");
                return Ok(None);
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut accounts = Vec::new();
        let mut seen = HashSet::new();

        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let account = Account::decode(line).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                line: index + 1,
                source,
            })?;

            if !seen.insert(account.id) {
                return Err(StorageError::DuplicateId {
                    path: self.path.clone(),
                    line: index + 1,
                    id: account.id,
                });
            }
            accounts.push(account);
        }

        debug!(path = %self.path.display(), count = accounts.len(), "loaded accounts");
        Ok(Some(accounts))
    }

    /// Rewrite the whole file from `accounts`.
    ///
    /// The content goes to a sibling `.tmp` file which is then renamed over
    /// the data file, so the previous contents survive a failed write.
    pub fn save(&self, accounts: &[Account]) -> Result<(), StorageError> {
        let mut lines = Vec::with_capacity(accounts.len());
        for account in accounts {
            let line = account.encode().map_err(|source| StorageError::Encode {
                path: self.path.clone(),
                id: account.id,
                source,
            })?;
            lines.push(line);
        }

        let tmp_path = self.tmp_path();
        self.write_lines(&tmp_path, &lines)
            .and_then(|()| fs::rename(&tmp_path, &self.path))
            .map_err(|source| {
                // Do not leave a stale temp file behind
                let _ = fs::remove_file(&tmp_path);
                StorageError::Write {
                    path: self.path.clone(),
                    source,
                }
            })?;

        debug!(path = %self.path.display(), count = accounts.len(), "saved accounts");
        Ok(())
    }

    fn write_lines(&self, target: &Path, lines: &[String]) -> io::Result<()> {
        let file = fs::File::create(target)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "# {}", self.file_name())?;
        for line in lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}
