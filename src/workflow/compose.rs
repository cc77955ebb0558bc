use std::time::{Duration, Instant};

use crate::db::{KeyValueStore, LocalState};
use crate::error::Result;
use crate::models::{Draft, NewPost, Post, PostForm};
use crate::services::PostRepository;

use super::debounce::Debouncer;

/// Authoring form with debounced autosave to local storage.
pub struct ComposeSession {
    form: PostForm,
    autosave: Debouncer,
    found_draft: Option<Draft>,
}

impl ComposeSession {
    /// Starts a fresh form, remembering any stored draft so the caller can
    /// offer to restore it.
    pub fn enter<S: KeyValueStore>(local: &LocalState<S>, autosave_delay: Duration) -> Self {
        Self {
            form: PostForm::default(),
            autosave: Debouncer::new(autosave_delay),
            found_draft: local.draft(),
        }
    }

    pub fn form(&self) -> &PostForm {
        &self.form
    }

    /// Draft awaiting a restore-or-discard decision.
    pub fn found_draft(&self) -> Option<&Draft> {
        self.found_draft.as_ref()
    }

    pub fn restore_draft(&mut self) {
        if let Some(draft) = self.found_draft.take() {
            self.form = draft.form;
        }
    }

    pub fn discard_draft<S: KeyValueStore>(&mut self, local: &LocalState<S>) {
        self.found_draft = None;
        local.clear_draft();
    }

    /// Applies a change to the form and pushes the autosave deadline back.
    pub fn edit(&mut self, now: Instant, change: impl FnOnce(&mut PostForm)) {
        change(&mut self.form);
        self.autosave.touch(now);
    }

    /// Writes the draft once the form has been quiet for the autosave window.
    pub fn tick<S: KeyValueStore>(&mut self, now: Instant, local: &LocalState<S>) -> Option<Draft> {
        if !self.autosave.poll(now) || !self.form.has_content() {
            return None;
        }
        tracing::debug!("Autosaving draft");
        Some(local.save_draft(&self.form))
    }

    /// Validates and creates the post. The stored draft is only cleared on
    /// success; on any error the form is left as it was.
    pub async fn submit<S, R>(&mut self, local: &LocalState<S>, repo: &R) -> Result<Post>
    where
        S: KeyValueStore,
        R: PostRepository,
    {
        self.form.validate()?;

        let new_post = NewPost::from_form(&self.form);
        let post = repo.create_post(&new_post).await?;

        self.autosave.cancel();
        local.clear_draft();
        tracing::info!("Created post {} ({})", post.id, post.title);

        Ok(post)
    }
}
