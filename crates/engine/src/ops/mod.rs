use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    EngineError, ResultEngine,
    session::{MemorySession, SessionStore},
    storage::Storage,
};

mod entries;
mod profile;
mod reports;
mod session;

pub use entries::EntryRef;
pub use session::GateState;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.storage.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of the ledger.
///
/// Owns the durable [`Storage`] and the ephemeral [`SessionStore`]. Every
/// operation on entries, the profile or reports goes through the session gate
/// and fails with [`EngineError::NotAuthenticated`] unless the gate is
/// [`GateState::Active`].
#[derive(Debug)]
pub struct Engine {
    storage: Storage,
    session: Arc<dyn SessionStore>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    async fn require_active(&self) -> ResultEngine<()> {
        match self.state().await? {
            GateState::Active => Ok(()),
            GateState::LoggedOut | GateState::Unregistered => Err(EngineError::NotAuthenticated),
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    session: Option<Arc<dyn SessionStore>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Session store to use; defaults to a [`MemorySession`].
    pub fn session(mut self, session: impl SessionStore + 'static) -> EngineBuilder {
        self.session = Some(Arc::new(session));
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            storage: Storage::new(self.database),
            session: self
                .session
                .unwrap_or_else(|| Arc::new(MemorySession::new())),
        }
    }
}
