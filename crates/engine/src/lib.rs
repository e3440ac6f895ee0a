//! Single-user income and expense ledger.
//!
//! The [`Engine`] stores one [`UserProfile`] and an ordered list of
//! [`Entry`] records in a SQLite database, guards access with a 4-digit PIN
//! and projects the data into dashboard, history and report views.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use engine::{Engine, FileSession};
//!
//! let db = sea_orm::Database::connect("sqlite:./spendbook.db?mode=rwc").await?;
//! let engine = Engine::builder()
//!     .database(db)
//!     .session(FileSession::new("/tmp/spendbook.session", chrono::Duration::minutes(30)))
//!     .build();
//! println!("{}", engine.state().await?);
//! # Ok(())
//! # }
//! ```

pub use entry::{Entry, EntryDraft, EntryId, EntryKind, EntryPatch, UNCATEGORIZED};
pub use error::EngineError;
pub use money::Money;
pub use ops::{Engine, EngineBuilder, EntryRef, GateState};
pub use pin::{Pin, PinHash};
pub use profile::{DEFAULT_PHOTO, Registration, UserProfile};
pub use session::{FileSession, MemorySession, SessionStore};
pub use storage::{Loaded, RecordKey, Storage};

pub mod aggregate;
pub mod photo;
pub mod records;
pub mod render;
pub mod view;

mod entry;
mod error;
mod money;
mod ops;
mod pin;
mod profile;
mod session;
mod storage;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
