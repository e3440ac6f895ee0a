//! Terminal input: masked PIN entry and yes/no confirmation.

use std::io::{BufRead, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};
use engine::Pin;

use crate::error::{AppError, Result};

/// Environment variable read instead of prompting, for scripted use.
pub const PIN_ENV: &str = "SPENDBOOK_PIN";

pub const MAX_PIN_ATTEMPTS: usize = 3;

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode().map_err(|err| {
            AppError::Terminal(format!("{err} (set {PIN_ENV} when not on a terminal)"))
        })?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

pub fn pin_from_env() -> Option<String> {
    std::env::var(PIN_ENV).ok()
}

fn notice(message: &str) -> Result<()> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

/// Reads one line without echoing it; each key shows as `*`.
pub fn read_pin(prompt: &str) -> Result<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Esc => {
                execute!(out, Print("\r\n"))?;
                return Err(AppError::Aborted("cancelled"));
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err(AppError::Aborted("interrupted"));
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

/// Asks for a new PIN and its confirmation, up to three times.
pub fn read_new_pin() -> Result<String> {
    if let Some(pin) = pin_from_env() {
        return Ok(pin);
    }

    for _ in 0..MAX_PIN_ATTEMPTS {
        let first = read_pin("Choose a 4-digit PIN: ")?;
        if let Err(err) = Pin::parse(&first) {
            notice(&err.to_string())?;
            continue;
        }

        let second = read_pin("Confirm PIN: ")?;
        if first.trim() == second.trim() {
            return Ok(first);
        }
        notice("PINs do not match. Try again.")?;
    }

    Err(AppError::Aborted("too many attempts"))
}

/// Prints a `[y/N]` question and reads the answer from stdin.
pub fn confirm(question: &str) -> Result<bool> {
    let mut out = std::io::stderr();
    write!(out, "{question} [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
