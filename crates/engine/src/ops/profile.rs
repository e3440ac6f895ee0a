use std::path::Path;

use crate::{
    EngineError, ResultEngine, UserProfile, photo,
    storage::{self, RecordKey},
};

use super::{Engine, with_tx};

impl Engine {
    /// The registered profile. Requires an active session.
    pub async fn profile(&self) -> ResultEngine<UserProfile> {
        self.require_active().await?;
        self.storage
            .load::<UserProfile>(RecordKey::User)
            .await?
            .optional(RecordKey::User)?
            .ok_or(EngineError::NotRegistered)
    }

    /// Replaces the profile photo with the image at `path`.
    ///
    /// The file is read before the profile record is touched.
    pub async fn update_photo(&self, path: &Path) -> ResultEngine<UserProfile> {
        self.require_active().await?;
        let data_url = photo::read_data_url(path).await?;

        let profile = with_tx!(self, |db_tx| {
            let mut profile = storage::load_with::<_, UserProfile>(&db_tx, RecordKey::User)
                .await?
                .optional(RecordKey::User)?
                .ok_or(EngineError::NotRegistered)?;
            profile.photo = data_url;
            storage::save_with(&db_tx, RecordKey::User, &profile).await?;
            Ok::<_, EngineError>(profile)
        })?;

        tracing::info!("profile photo updated");
        Ok(profile)
    }
}
