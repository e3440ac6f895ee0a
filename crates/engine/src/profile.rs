//! The registered user's identity and credentials.

use serde::{Deserialize, Serialize};

use crate::{EngineError, PinHash, ResultEngine, util::normalize_text};

/// Image reference used when no photo was uploaded.
pub const DEFAULT_PHOTO: &str = "assets/default-profile.png";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub pin: PinHash,
    /// A `data:` URL, or [`DEFAULT_PHOTO`].
    pub photo: String,
}

/// Everything the registration form collects.
#[derive(Clone, Debug)]
pub struct Registration {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub pin: String,
    pub photo: Option<std::path::PathBuf>,
}

impl UserProfile {
    pub(crate) fn new(
        name: &str,
        phone: &str,
        email: &str,
        pin: PinHash,
        photo: Option<String>,
    ) -> ResultEngine<Self> {
        let name = normalize_text(name);
        if name.is_empty() {
            return Err(EngineError::InvalidProfile(
                "name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name,
            phone: phone.trim().to_string(),
            email: email.trim().to_string(),
            pin,
            photo: photo.unwrap_or_else(|| DEFAULT_PHOTO.to_string()),
        })
    }

    /// Key a session is bound to. Unique per registration, so a session
    /// opened for one store never unlocks another.
    pub fn session_owner(&self) -> &str {
        &self.pin.salt
    }

    pub fn has_custom_photo(&self) -> bool {
        self.photo != DEFAULT_PHOTO
    }
}
