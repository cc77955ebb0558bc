use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AppError;
use crate::models::{DemographicsProfile, Draft, PostForm, PostId};

use super::store::KeyValueStore;

const VOTED_POSTS_KEY: &str = "votedPosts";
const DEMOGRAPHICS_KEY: &str = "userDemographics";
const DRAFT_KEY: &str = "postDraft";

/// Typed view over the local key-value store.
///
/// Reads and writes never fail: a missing, unreadable or malformed value is
/// logged and treated as absent.
pub struct LocalState<S> {
    store: S,
}

impl<S: KeyValueStore> LocalState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // Vote history

    pub fn voted_posts(&self) -> Vec<PostId> {
        self.read(VOTED_POSTS_KEY).unwrap_or_default()
    }

    pub fn add_voted_post(&self, id: &PostId) {
        let mut voted = self.voted_posts();
        if !voted.contains(id) {
            voted.push(id.clone());
            self.write(VOTED_POSTS_KEY, &voted);
        }
    }

    pub fn has_voted(&self, id: &PostId) -> bool {
        self.voted_posts().contains(id)
    }

    // Demographics

    pub fn demographics(&self) -> Option<DemographicsProfile> {
        self.read(DEMOGRAPHICS_KEY)
    }

    pub fn set_demographics(&self, profile: &DemographicsProfile) {
        self.write(DEMOGRAPHICS_KEY, profile);
    }

    // Draft

    pub fn save_draft(&self, form: &PostForm) -> Draft {
        let draft = Draft {
            form: form.clone(),
            saved_at: Utc::now(),
        };
        self.write(DRAFT_KEY, &draft);
        draft
    }

    pub fn draft(&self) -> Option<Draft> {
        self.read(DRAFT_KEY)
    }

    pub fn clear_draft(&self) {
        if let Err(e) = self.store.remove(DRAFT_KEY) {
            tracing::warn!("Failed to clear draft: {}", e);
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring malformed {}: {}", key, e);
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(AppError::from)
            .and_then(|raw| self.store.set(key, &raw));

        if let Err(e) = result {
            tracing::warn!("Failed to save {}: {}", key, e);
        }
    }
}
