//! Session gate: registration, PIN login and logout.

use std::fmt;

use crate::{
    EngineError, Entry, Pin, PinHash, Registration, ResultEngine, UserProfile, photo,
    storage::{self, RecordKey},
};

use super::{Engine, with_tx};

/// Where the user stands with respect to the app.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    /// No profile persisted: only registration is possible.
    Unregistered,
    /// A profile exists but the PIN has not been entered in this session.
    LoggedOut,
    Active,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unregistered => "unregistered",
            Self::LoggedOut => "logged out",
            Self::Active => "active",
        })
    }
}

impl Engine {
    /// Current gate state. A corrupt profile record is an error, never
    /// `Unregistered`.
    pub async fn state(&self) -> ResultEngine<GateState> {
        let Some(profile) = self
            .storage
            .load::<UserProfile>(RecordKey::User)
            .await?
            .optional(RecordKey::User)?
        else {
            return Ok(GateState::Unregistered);
        };
        if self.session.is_active(profile.session_owner())? {
            Ok(GateState::Active)
        } else {
            Ok(GateState::LoggedOut)
        }
    }

    /// Creates the profile and an empty ledger, then opens a session.
    ///
    /// The PIN is validated before anything else; the photo, if any, is read
    /// completely before the profile is written, so a failed read leaves the
    /// store untouched.
    pub async fn register(&self, registration: Registration) -> ResultEngine<UserProfile> {
        if self.state().await? != GateState::Unregistered {
            return Err(EngineError::AlreadyRegistered);
        }

        let pin = Pin::parse(&registration.pin)?;
        let photo = match registration.photo.as_deref() {
            Some(path) => Some(photo::read_data_url(path).await?),
            None => None,
        };
        let profile = UserProfile::new(
            &registration.name,
            &registration.phone,
            &registration.email,
            PinHash::new(&pin),
            photo,
        )?;

        with_tx!(self, |db_tx| {
            storage::save_with(&db_tx, RecordKey::User, &profile).await?;
            storage::save_with(&db_tx, RecordKey::Entries, &Vec::<Entry>::new()).await?;
            Ok::<_, EngineError>(())
        })?;
        self.session.start(profile.session_owner())?;

        tracing::info!(name = %profile.name, "profile registered");
        Ok(profile)
    }

    /// Opens a session if `pin` matches the registered PIN exactly.
    pub async fn login(&self, pin: &str) -> ResultEngine<()> {
        let profile = self
            .storage
            .load::<UserProfile>(RecordKey::User)
            .await?
            .optional(RecordKey::User)?
            .ok_or(EngineError::NotRegistered)?;

        if !profile.pin.verify(pin) {
            tracing::warn!("login rejected: wrong PIN");
            return Err(EngineError::WrongPin);
        }

        self.session.start(profile.session_owner())?;
        tracing::info!("session started");
        Ok(())
    }

    /// Wipes the profile, every entry and the session.
    ///
    /// Afterwards the gate is [`GateState::Unregistered`], not `LoggedOut`.
    pub async fn logout(&self) -> ResultEngine<()> {
        self.require_active().await?;
        self.reset().await
    }

    /// Same wipe as [`Engine::logout`] without requiring a session. Used to
    /// recover from a profile record that can no longer be read.
    pub async fn reset(&self) -> ResultEngine<()> {
        self.storage.clear().await?;
        self.session.clear()?;
        tracing::info!("all data cleared");
        Ok(())
    }
}
