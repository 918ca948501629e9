use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::application::{Command, LedgerService, Outcome};
use crate::domain::{format_cents, parse_cents, Account, AccountId, Cents};
use crate::io::Exporter;
use crate::storage::DEFAULT_DATA_FILE;

mod menu;

pub use menu::*;

/// Smart Bank - console account ledger
#[derive(Parser)]
#[command(name = "smartbank")]
#[command(about = "A single-user bank account ledger kept in a flat text file")]
#[command(version)]
pub struct Cli {
    /// Data file path
    #[arg(short, long, env = "SMARTBANK_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: PathBuf,

    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Open a new account
    Create {
        /// Account holder's full name
        holder: String,

        /// Opening deposit (at least 1000)
        amount: String,
    },

    /// Deposit money into an account
    Deposit {
        /// Account number
        id: AccountId,

        /// Amount to deposit (e.g., "500.00" or "500")
        amount: String,
    },

    /// Withdraw money from an account
    Withdraw {
        /// Account number
        id: AccountId,

        /// Amount to withdraw (e.g., "500.00" or "500")
        amount: String,
    },

    /// Show a single account
    Show {
        /// Account number
        id: AccountId,
    },

    /// List all accounts
    List,

    /// Export all accounts
    Export {
        /// Output format
        #[arg(value_enum)]
        format: ExportFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let (mut service, summary) = LedgerService::open(&self.data)
            .with_context(|| format!("Failed to load {}", self.data.display()))?;

        let command = match self.command.unwrap_or(Commands::Menu) {
            Commands::Menu => {
                let stdin = io::stdin();
                let mut menu = Menu::new(&mut service, stdin.lock(), io::stdout());
                menu.report_load(summary)?;
                menu.run()?;
                return Ok(());
            }
            Commands::Export { format, output } => {
                return run_export_command(&service, format, output);
            }
            Commands::Create { holder, amount } => Command::Create {
                holder,
                opening_balance: parse_amount(&amount)?,
            },
            Commands::Deposit { id, amount } => Command::Deposit {
                id,
                amount: parse_amount(&amount)?,
            },
            Commands::Withdraw { id, amount } => Command::Withdraw {
                id,
                amount: parse_amount(&amount)?,
            },
            Commands::Show { id } => Command::Search { id },
            Commands::List => Command::ListAll,
        };

        let outcome = service.handle(command)?;
        let mut out = io::stdout().lock();
        print_outcome(&mut out, &outcome)?;
        Ok(())
    }
}

fn parse_amount(amount: &str) -> Result<Cents> {
    parse_cents(amount).context("Invalid amount format. Use '1500.00' or '1500'")
}

fn print_outcome<W: Write>(out: &mut W, outcome: &Outcome) -> io::Result<()> {
    match outcome {
        Outcome::Created(account) => {
            writeln!(out, "Created account {} for {}", account.id, account.holder)?;
            write_account_card(out, account)
        }
        Outcome::Deposited { account, amount } => writeln!(
            out,
            "Deposited {} into {} | New balance: {}",
            format_cents(*amount),
            account.id,
            format_cents(account.balance)
        ),
        Outcome::Withdrawn { account, amount } => writeln!(
            out,
            "Withdrawn {} from {} | New balance: {}",
            format_cents(*amount),
            account.id,
            format_cents(account.balance)
        ),
        Outcome::Found(account) => write_account_card(out, account),
        Outcome::Accounts(accounts) => write_account_table(out, accounts),
        Outcome::Empty => writeln!(out, "No accounts found."),
    }
}

/// Multi-line description of one account, as shown by the menu.
pub fn write_account_card<W: Write>(out: &mut W, account: &Account) -> io::Result<()> {
    writeln!(out, "  --------------------------------")?;
    writeln!(out, "  Account Number : {}", account.id)?;
    writeln!(out, "  Account Holder : {}", account.holder)?;
    writeln!(out, "  Balance        : {}", format_cents(account.balance))?;
    writeln!(out, "  --------------------------------")
}

pub fn write_account_table<W: Write>(out: &mut W, accounts: &[Account]) -> io::Result<()> {
    writeln!(out, "{:<8} {:<24} {:>14}", "NUMBER", "HOLDER", "BALANCE")?;
    writeln!(out, "{}", "-".repeat(48))?;
    for account in accounts {
        writeln!(
            out,
            "{:<8} {:<24} {:>14}",
            account.id,
            account.holder,
            format_cents(account.balance)
        )?;
    }
    Ok(())
}

fn run_export_command(
    service: &LedgerService,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(io::stdout()),
    };

    let count = match format {
        ExportFormat::Csv => exporter.export_csv(writer)?,
        ExportFormat::Json => exporter.export_json(writer)?,
    };
    if output.is_some() {
        eprintln!("Exported {} accounts", count);
    }

    Ok(())
}
