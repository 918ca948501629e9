//! Interactive six-item menu.
//!
//! The menu only gathers input and renders results; every action is a
//! [`Command`] handed to [`LedgerService::handle`]. Input and output are
//! generic so the whole loop can be driven from tests.

use std::io::{self, BufRead, Write};

use crate::application::{AppError, Command, LedgerService, LoadSummary, Outcome};
use crate::domain::{format_cents, parse_cents, AccountId, Cents, ParseCentsError, MIN_BALANCE};

use super::write_account_card;

/// Main menu entries, numbered as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Withdraw = 1,
    Deposit = 2,
    DisplayAll = 3,
    Create = 4,
    Search = 5,
    Exit = 6,
}

impl MenuChoice {
    /// Parse a raw input line. `None` means the input is not a number.
    pub fn parse(input: &str) -> Option<Result<Self, i64>> {
        let number: i64 = input.trim().parse().ok()?;
        Some(match number {
            1 => Ok(Self::Withdraw),
            2 => Ok(Self::Deposit),
            3 => Ok(Self::DisplayAll),
            4 => Ok(Self::Create),
            5 => Ok(Self::Search),
            6 => Ok(Self::Exit),
            other => Err(other),
        })
    }
}

pub struct Menu<'a, R, W> {
    service: &'a mut LedgerService,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(service: &'a mut LedgerService, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    /// Tell the user what startup found on disk.
    pub fn report_load(&mut self, summary: LoadSummary) -> io::Result<()> {
        match summary {
            LoadSummary::Fresh => writeln!(self.output, "  [Info] No saved data. Starting fresh."),
            LoadSummary::Loaded(count) => {
                writeln!(self.output, "  [Info] {count} account(s) loaded.")
            }
        }
    }

    /// Loop until Exit is chosen or input runs out.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "  ===================================")?;
        writeln!(self.output, "       Welcome to Smart Bank System   ")?;
        writeln!(self.output, "  ===================================")?;

        loop {
            self.show_menu()?;
            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                return self.goodbye();
            };

            match MenuChoice::parse(&line) {
                Some(Ok(MenuChoice::Exit)) => return self.goodbye(),
                Some(Ok(choice)) => self.dispatch(choice)?,
                Some(Err(_)) => writeln!(
                    self.output,
                    "  [!] Invalid choice. Please enter a number between 1 and 6."
                )?,
                None => writeln!(self.output, "  [!] Enter a number 1-6.")?,
            }
        }
    }

    fn show_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "  --- Main Menu ---")?;
        writeln!(self.output, "  1. Withdraw")?;
        writeln!(self.output, "  2. Deposit")?;
        writeln!(self.output, "  3. Display All Accounts")?;
        writeln!(self.output, "  4. Create Account")?;
        writeln!(self.output, "  5. Search Account")?;
        writeln!(self.output, "  6. Exit")?;
        self.prompt("Enter your choice (1-6): ")
    }

    fn goodbye(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "  Thank you for using Smart Bank System. Goodbye!"
        )?;
        self.output.flush()
    }

    fn dispatch(&mut self, choice: MenuChoice) -> io::Result<()> {
        match choice {
            MenuChoice::Withdraw => self.withdraw(),
            MenuChoice::Deposit => self.deposit(),
            MenuChoice::DisplayAll => self.display_all(),
            MenuChoice::Create => self.create(),
            MenuChoice::Search => self.search(),
            MenuChoice::Exit => Ok(()),
        }
    }

    fn withdraw(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n  === Withdraw Money ===")?;
        let Some(id) = self.ask_account()? else {
            return Ok(());
        };
        let Some(amount) = self.ask_amount("Enter amount to withdraw: ")? else {
            return Ok(());
        };
        self.execute(Command::Withdraw { id, amount })
    }

    fn deposit(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n  === Deposit Money ===")?;
        let Some(id) = self.ask_account()? else {
            return Ok(());
        };
        let Some(amount) = self.ask_amount("Enter amount to deposit: ")? else {
            return Ok(());
        };
        self.execute(Command::Deposit { id, amount })
    }

    fn display_all(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n  === All Accounts ===")?;
        self.execute(Command::ListAll)
    }

    fn create(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n  === Create New Account ===")?;
        self.prompt("Enter your full name: ")?;
        let Some(holder) = self.read_line()? else {
            return Ok(());
        };
        if holder.trim().is_empty() {
            return writeln!(self.output, "  [!] Name cannot be empty.");
        }

        let prompt = format!(
            "Enter opening deposit (min {}): ",
            format_cents(MIN_BALANCE)
        );
        let Some(opening_balance) = self.ask_amount(&prompt)? else {
            return Ok(());
        };
        self.execute(Command::Create {
            holder,
            opening_balance,
        })
    }

    fn search(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n  === Search Account ===")?;
        self.prompt("Enter Account Number: ")?;
        let Some(line) = self.read_line()? else {
            return Ok(());
        };
        match line.trim().parse::<AccountId>() {
            Ok(id) => self.execute(Command::Search { id }),
            Err(_) => writeln!(self.output, "  [!] Invalid number."),
        }
    }

    /// Ask for an account number and make sure it exists before going on.
    fn ask_account(&mut self) -> io::Result<Option<AccountId>> {
        self.prompt("Enter Account Number: ")?;
        let Some(line) = self.read_line()? else {
            return Ok(None);
        };
        let Ok(id) = line.trim().parse::<AccountId>() else {
            writeln!(self.output, "  [!] Invalid number.")?;
            return Ok(None);
        };
        match self.service.find(id) {
            Some(account) => {
                writeln!(self.output, "  Found: {}", account.holder)?;
                Ok(Some(id))
            }
            None => {
                self.report_error(&AppError::AccountNotFound(id))?;
                Ok(None)
            }
        }
    }

    fn ask_amount(&mut self, prompt: &str) -> io::Result<Option<Cents>> {
        self.prompt(prompt)?;
        let Some(line) = self.read_line()? else {
            return Ok(None);
        };
        match parse_cents(&line) {
            Ok(amount) => Ok(Some(amount)),
            Err(ParseCentsError::TooManyDecimals(_)) => {
                writeln!(
                    self.output,
                    "  [!] Invalid amount. Use at most two decimal places."
                )?;
                Ok(None)
            }
            Err(_) => {
                writeln!(self.output, "  [!] Invalid amount.")?;
                Ok(None)
            }
        }
    }

    fn execute(&mut self, command: Command) -> io::Result<()> {
        match self.service.handle(command) {
            Ok(outcome) => self.report_outcome(&outcome),
            Err(e) => self.report_error(&e),
        }
    }

    fn report_outcome(&mut self, outcome: &Outcome) -> io::Result<()> {
        match outcome {
            Outcome::Created(account) => {
                writeln!(self.output, "\n  [OK] Account created!")?;
                write_account_card(&mut self.output, account)
            }
            Outcome::Deposited { account, amount } => writeln!(
                self.output,
                "  Deposited {}  |  New Balance: {}",
                format_cents(*amount),
                format_cents(account.balance)
            ),
            Outcome::Withdrawn { account, amount } => writeln!(
                self.output,
                "  Withdrawn {}  |  New Balance: {}",
                format_cents(*amount),
                format_cents(account.balance)
            ),
            Outcome::Found(account) => {
                writeln!(self.output, "  [OK] Account found:")?;
                write_account_card(&mut self.output, account)
            }
            Outcome::Accounts(accounts) => {
                writeln!(self.output, "  Total: {}", accounts.len())?;
                for account in accounts {
                    write_account_card(&mut self.output, account)?;
                }
                Ok(())
            }
            Outcome::Empty => writeln!(self.output, "  No accounts yet."),
        }
    }

    fn report_error(&mut self, error: &AppError) -> io::Result<()> {
        match error {
            AppError::InsufficientFunds { max_withdrawal, .. } => {
                writeln!(
                    self.output,
                    "  Cannot withdraw. Min balance {} required.",
                    format_cents(MIN_BALANCE)
                )?;
                writeln!(
                    self.output,
                    "  Max you can take: {}",
                    format_cents(*max_withdrawal)
                )
            }
            AppError::Persistence { .. } => {
                writeln!(self.output, "  [Error] Could not save file: {error}")
            }
            other => writeln!(self.output, "  [!] {other}."),
        }
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.output, "  {text}")?;
        self.output.flush()
    }

    /// Next input line without its terminator, or `None` at end of input.
    /// Bytes that are not valid UTF-8 are replaced rather than ending the session.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("1"), Some(Ok(MenuChoice::Withdraw)));
        assert_eq!(MenuChoice::parse(" 6 "), Some(Ok(MenuChoice::Exit)));
        assert_eq!(MenuChoice::parse("7"), Some(Err(7)));
        assert_eq!(MenuChoice::parse("0"), Some(Err(0)));
        assert_eq!(MenuChoice::parse("-1"), Some(Err(-1)));
        assert_eq!(MenuChoice::parse("99999999999"), Some(Err(99_999_999_999)));
        assert_eq!(MenuChoice::parse("six"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }
}
