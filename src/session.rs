use crate::storage::{SessionStorage, StorageError};
use crate::types::UserProfile;

/// Session storage key holding the serialized current profile.
pub const USER_KEY: &str = "user";

/// Owner of the current user profile. `login` is the single write path: it
/// takes the entire next-state profile, never a patch.
pub struct SessionHolder<S: SessionStorage> {
    storage: S,
    current: Option<UserProfile>,
}

impl<S: SessionStorage> SessionHolder<S> {
    /// Restores the profile persisted in `storage`, if any.
    pub fn hydrate(storage: S) -> Self {
        let current = read_profile(&storage);
        if let Some(profile) = &current {
            tracing::info!(user = %profile.id, "session restored");
        }
        Self { storage, current }
    }

    pub fn current(&self) -> Option<&UserProfile> {
        self.current.as_ref()
    }

    /// Replaces the held profile, then persists it. On a persistence error the
    /// in-memory profile is already updated and the stored copy is stale.
    pub fn login(&mut self, profile: UserProfile) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(&profile)?;
        tracing::debug!(user = %profile.id, xp = profile.xp, "session profile replaced");
        self.current = Some(profile);
        self.storage.set_item(USER_KEY, serialized)
    }

    pub fn logout(&mut self) -> Result<(), StorageError> {
        if let Some(profile) = self.current.take() {
            tracing::info!(user = %profile.id, "logged out");
        }
        self.storage.remove_item(USER_KEY)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

/// Parses the stored profile. A malformed value is logged and read as "no user".
pub fn read_profile(storage: &impl SessionStorage) -> Option<UserProfile> {
    let raw = storage.get_item(USER_KEY)?;
    match serde_json::from_str::<UserProfile>(&raw) {
        Ok(mut profile) => {
            let dropped: usize = profile.progress.values_mut().map(|p| p.normalize()).sum();
            if dropped > 0 {
                tracing::warn!(user = %profile.id, dropped, "stored profile had steps both completed and in progress");
            }
            Some(profile)
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to parse user from session storage");
            None
        }
    }
}
