use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{
    Engine, EngineError, EntryDraft, EntryKind, EntryPatch, EntryRef, GateState, Money,
    Registration,
    aggregate::{DateRange, KindFilter, ReportFilter},
    render::{self, ReportFormat},
};

use crate::{
    error::{AppError, Result},
    prompt,
    settings::{Overrides, Settings},
};

#[derive(Parser, Debug)]
#[command(name = "spendbook", version)]
#[command(about = "Personal income and expense tracker")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the profile. The PIN is asked on the terminal.
    Register(RegisterArgs),
    /// Unlock the ledger with the PIN.
    Login,
    /// Show whether a profile exists and the session is open.
    Status,
    /// Total income, expense and balance.
    Dashboard,
    /// Record a new income or expense.
    Add(AddArgs),
    /// Change fields of an entry.
    Edit(EditArgs),
    /// Remove an entry.
    Delete(DeleteArgs),
    /// List every entry.
    History,
    /// Report for a date range.
    Report(ReportArgs),
    /// Replace the profile photo.
    Photo(PhotoArgs),
    /// Delete the profile and every entry.
    Logout(LogoutArgs),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    email: String,
    /// Image file to use as profile photo.
    #[arg(long)]
    photo: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// `income` or `expense`.
    #[arg(long = "type")]
    kind: String,
    /// Decimal amount, e.g. 1250.50.
    #[arg(long)]
    amount: String,
    /// Entry date (YYYY-MM-DD); today when omitted.
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    category: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Entry id, id prefix or `#position` from `history`.
    entry: String,
    #[arg(long = "type")]
    kind: Option<String>,
    #[arg(long)]
    amount: Option<String>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Entry id, id prefix or `#position` from `history`.
    entry: String,
    /// Skip the confirmation question.
    #[arg(long, short)]
    yes: bool,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[arg(long)]
    from: NaiveDate,
    #[arg(long)]
    to: NaiveDate,
    /// `all`, `income` or `expense`.
    #[arg(long = "type", default_value = "all")]
    kind: String,
    /// `text`, `html` or `csv`.
    #[arg(long, default_value = "text")]
    format: String,
    /// Write the report to a file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PhotoArgs {
    path: PathBuf,
}

#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// Skip the confirmation question.
    #[arg(long, short)]
    yes: bool,
    /// Wipe the data even without a session, e.g. when the profile
    /// record can no longer be read.
    #[arg(long)]
    force: bool,
}

pub async fn run(engine: &Engine, settings: &Settings, command: Command) -> Result<()> {
    let symbol = settings.currency_symbol.as_str();
    match command {
        Command::Register(args) => register(engine, args).await,
        Command::Login => login(engine).await,
        Command::Status => {
            println!("{}", engine.state().await?);
            Ok(())
        }
        Command::Dashboard => {
            let profile = engine.profile().await?;
            let dash = engine.dashboard(symbol).await?;
            println!("Hello, {}", profile.name);
            println!("Income:  {:>14}", dash.income);
            println!("Expense: {:>14}", dash.expense);
            println!("Balance: {:>14}", dash.net);
            if dash.in_deficit {
                println!("You are spending more than you earn.");
            }
            Ok(())
        }
        Command::Add(args) => {
            let draft = EntryDraft {
                kind: args.kind.parse()?,
                date: match args.date {
                    Some(date) => date,
                    None => settings.today()?,
                },
                description: args.description,
                category: args.category,
                amount: Money::parse_non_negative(&args.amount)?,
            };
            let entry = engine.add_entry(draft).await?;
            println!("Added {} {}", entry.kind, entry.id.short());
            Ok(())
        }
        Command::Edit(args) => {
            let reference: EntryRef = args.entry.parse()?;
            let patch = EntryPatch {
                kind: args.kind.as_deref().map(str::parse::<EntryKind>).transpose()?,
                date: args.date,
                description: args.description,
                category: args.category,
                amount: args
                    .amount
                    .as_deref()
                    .map(Money::parse_non_negative)
                    .transpose()?,
            };
            if patch.is_empty() {
                return Err(EngineError::InvalidEntry("nothing to change".to_string()).into());
            }
            let entry = engine.update_entry(&reference, patch).await?;
            println!("Updated {}", entry.id.short());
            Ok(())
        }
        Command::Delete(args) => {
            let reference: EntryRef = args.entry.parse()?;
            let entry = engine.entry(&reference).await?;
            let question = format!(
                "Delete {} \"{}\" of {} {}?",
                entry.kind,
                entry.description,
                entry.amount.format(symbol),
                entry.date
            );
            if !args.yes && !prompt::confirm(&question)? {
                return Err(AppError::Aborted("nothing deleted"));
            }
            let removed = engine.delete_entry(&EntryRef::Id(entry.id)).await?;
            println!("Deleted {}", removed.id.short());
            Ok(())
        }
        Command::History => {
            let rows = engine.history(symbol).await?;
            print!("{}", render::history_table(&rows));
            Ok(())
        }
        Command::Report(args) => report(engine, settings, args).await,
        Command::Photo(args) => {
            engine.update_photo(&args.path).await?;
            println!("Profile photo updated.");
            Ok(())
        }
        Command::Logout(args) => logout(engine, args).await,
    }
}

async fn register(engine: &Engine, args: RegisterArgs) -> Result<()> {
    if engine.state().await? != GateState::Unregistered {
        return Err(EngineError::AlreadyRegistered.into());
    }
    let pin = prompt::read_new_pin()?;
    let profile = engine
        .register(Registration {
            name: args.name,
            phone: args.phone,
            email: args.email,
            pin,
            photo: args.photo,
        })
        .await?;
    println!("Welcome, {}. Your ledger is ready.", profile.name);
    Ok(())
}

async fn login(engine: &Engine) -> Result<()> {
    match engine.state().await? {
        GateState::Unregistered => return Err(EngineError::NotRegistered.into()),
        GateState::Active => {
            println!("Already logged in.");
            return Ok(());
        }
        GateState::LoggedOut => {}
    }

    if let Some(pin) = prompt::pin_from_env() {
        engine.login(&pin).await?;
        println!("Logged in.");
        return Ok(());
    }

    for attempt in 1..=prompt::MAX_PIN_ATTEMPTS {
        let pin = prompt::read_pin("PIN: ")?;
        match engine.login(&pin).await {
            Ok(()) => {
                println!("Logged in.");
                return Ok(());
            }
            Err(EngineError::WrongPin) if attempt < prompt::MAX_PIN_ATTEMPTS => {
                eprintln!("Incorrect PIN. Try again.");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(EngineError::WrongPin.into())
}

async fn report(engine: &Engine, settings: &Settings, args: ReportArgs) -> Result<()> {
    let filter = ReportFilter {
        range: DateRange::new(args.from, args.to)?,
        kind: args.kind.parse::<KindFilter>()?,
    };
    let format: ReportFormat = args.format.parse()?;

    let doc = engine
        .report(&filter, &settings.currency_symbol, settings.now()?)
        .await?;
    if doc.is_empty() {
        eprintln!("No entries found for the selected criteria.");
    }
    let rendered = render::render(&doc, format)?;

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, rendered).await?;
            println!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

async fn logout(engine: &Engine, args: LogoutArgs) -> Result<()> {
    let question = "This deletes your profile and every entry. Continue?";
    if !args.yes && !prompt::confirm(question)? {
        return Err(AppError::Aborted("nothing deleted"));
    }
    if args.force {
        engine.reset().await?;
    } else {
        engine.logout().await?;
    }
    println!("All data cleared.");
    Ok(())
}
