// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use smartbank::application::LedgerService;
use smartbank::storage::DEFAULT_DATA_FILE;
use smartbank::Repository;
use tempfile::TempDir;

/// Helper to create an empty service backed by a file in a temporary directory
pub fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::new(Repository::new(data_path(&temp_dir)));
    Ok((service, temp_dir))
}

/// Path of the data file inside a test directory
pub fn data_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join(DEFAULT_DATA_FILE)
}

/// Write raw file contents, then open a service on them
pub fn service_from_file(contents: &str) -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    fs::write(data_path(&temp_dir), contents)?;
    let (service, _) = LedgerService::open(data_path(&temp_dir))?;
    Ok((service, temp_dir))
}

/// Test fixture: Alice (1001) with 1500.00 already on file
pub fn service_with_alice() -> Result<(LedgerService, TempDir)> {
    let (mut service, temp_dir) = test_service()?;
    service.create("Alice", 150_000)?;
    Ok((service, temp_dir))
}
