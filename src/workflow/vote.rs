use crate::db::{KeyValueStore, LocalState};
use crate::error::{AppError, Result};
use crate::models::{DemographicsForm, Post, Side};
use crate::services::PostRepository;

/// What the caller should show after a vote request.
#[derive(Debug, Clone, PartialEq)]
pub enum VoteOutcome {
    /// Demographics are missing; the vote for this side is on hold.
    DemographicsRequired(Side),
    /// The vote was stored; carries the post with its new counters.
    Recorded(Post),
}

/// Voting state for one opened post.
pub struct VoteSession {
    post: Post,
    has_voted: bool,
    pending_side: Option<Side>,
}

impl VoteSession {
    pub fn open<S: KeyValueStore>(post: Post, local: &LocalState<S>) -> Self {
        let has_voted = local.has_voted(&post.id);
        Self {
            post,
            has_voted,
            pending_side: None,
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn has_voted(&self) -> bool {
        self.has_voted
    }

    pub fn pending_side(&self) -> Option<Side> {
        self.pending_side
    }

    pub async fn cast_vote<S, R>(
        &mut self,
        side: Side,
        local: &LocalState<S>,
        repo: &R,
    ) -> Result<VoteOutcome>
    where
        S: KeyValueStore,
        R: PostRepository,
    {
        if self.has_voted {
            return Err(AppError::AlreadyVoted);
        }

        if local.demographics().is_none() {
            self.pending_side = Some(side);
            return Ok(VoteOutcome::DemographicsRequired(side));
        }

        self.submit(side, local, repo).await
    }

    /// Stores the profile and resumes the vote that was waiting for it.
    ///
    /// Returns `None` when no vote was pending.
    pub async fn submit_demographics<S, R>(
        &mut self,
        form: &DemographicsForm,
        local: &LocalState<S>,
        repo: &R,
    ) -> Result<Option<VoteOutcome>>
    where
        S: KeyValueStore,
        R: PostRepository,
    {
        let profile = form.submit()?;
        local.set_demographics(&profile);

        let Some(side) = self.pending_side.take() else {
            return Ok(None);
        };

        if self.has_voted {
            return Err(AppError::AlreadyVoted);
        }

        self.submit(side, local, repo).await.map(Some)
    }

    pub fn cancel_demographics(&mut self) {
        self.pending_side = None;
    }

    async fn submit<S, R>(&mut self, side: Side, local: &LocalState<S>, repo: &R) -> Result<VoteOutcome>
    where
        S: KeyValueStore,
        R: PostRepository,
    {
        let current = self.post.votes(side);
        let updated = repo.increment_vote(&self.post.id, side, current).await?;

        self.post.set_votes(side, updated);
        local.add_voted_post(&self.post.id);
        self.has_voted = true;
        self.pending_side = None;

        tracing::info!(
            "Vote recorded on {} for side {:?} ({} -> {})",
            self.post.id,
            side,
            current,
            updated
        );

        Ok(VoteOutcome::Recorded(self.post.clone()))
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::block_on;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{AgeGroup, DemographicsProfile, Gender};
    use crate::services::fake::{sample_post, FakeRepository};

    fn profile() -> DemographicsProfile {
        DemographicsProfile {
            gender: Gender::Female,
            age_group: AgeGroup::Thirties,
        }
    }

    fn female_thirties() -> DemographicsForm {
        DemographicsForm {
            gender: Some(Gender::Female),
            age_group: Some(AgeGroup::Thirties),
        }
    }

    #[test]
    fn vote_with_profile_is_recorded() {
        let local = LocalState::new(MemoryStore::default());
        local.set_demographics(&profile());
        let repo = FakeRepository::with_posts(vec![sample_post("1", 3, 7)]);
        let mut session = VoteSession::open(sample_post("1", 3, 7), &local);

        let outcome = block_on(session.cast_vote(Side::B, &local, &repo)).unwrap();

        match outcome {
            VoteOutcome::Recorded(post) => {
                assert_eq!(post.votes_a, 3);
                assert_eq!(post.votes_b, 8);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(repo.vote_calls.get(), 1);
        assert!(session.has_voted());
        assert!(local.has_voted(&session.post().id));
    }

    #[test]
    fn missing_profile_defers_vote_until_collected() {
        let local = LocalState::new(MemoryStore::default());
        let repo = FakeRepository::with_posts(vec![sample_post("1", 0, 0)]);
        let mut session = VoteSession::open(sample_post("1", 0, 0), &local);

        let outcome = block_on(session.cast_vote(Side::A, &local, &repo)).unwrap();
        assert_eq!(outcome, VoteOutcome::DemographicsRequired(Side::A));
        assert_eq!(session.pending_side(), Some(Side::A));
        assert_eq!(repo.vote_calls.get(), 0);

        let resumed =
            block_on(session.submit_demographics(&female_thirties(), &local, &repo)).unwrap();
        assert!(matches!(resumed, Some(VoteOutcome::Recorded(ref p)) if p.votes_a == 1));
        assert_eq!(repo.vote_calls.get(), 1);
        assert_eq!(local.demographics(), Some(profile()));
        assert_eq!(session.pending_side(), None);

        // A second submission has nothing left to resume.
        let again =
            block_on(session.submit_demographics(&female_thirties(), &local, &repo)).unwrap();
        assert_eq!(again, None);
        assert_eq!(repo.vote_calls.get(), 1);
    }

    #[test]
    fn already_voted_makes_no_remote_call() {
        let local = LocalState::new(MemoryStore::default());
        local.set_demographics(&profile());
        let post = sample_post("5", 2, 2);
        local.add_voted_post(&post.id);
        let repo = FakeRepository::with_posts(vec![post.clone()]);
        let mut session = VoteSession::open(post, &local);

        let result = block_on(session.cast_vote(Side::A, &local, &repo));
        assert!(matches!(result, Err(AppError::AlreadyVoted)));
        assert_eq!(repo.vote_calls.get(), 0);
        assert_eq!(session.post().votes_a, 2);
        assert_eq!(session.post().votes_b, 2);
    }

    #[test]
    fn second_vote_in_same_session_is_rejected() {
        let local = LocalState::new(MemoryStore::default());
        local.set_demographics(&profile());
        let repo = FakeRepository::with_posts(vec![sample_post("1", 0, 0)]);
        let mut session = VoteSession::open(sample_post("1", 0, 0), &local);

        block_on(session.cast_vote(Side::A, &local, &repo)).unwrap();
        let second = block_on(session.cast_vote(Side::B, &local, &repo));
        assert!(matches!(second, Err(AppError::AlreadyVoted)));
        assert_eq!(repo.vote_calls.get(), 1);
    }

    #[test]
    fn incomplete_demographics_change_nothing() {
        let local = LocalState::new(MemoryStore::default());
        let repo = FakeRepository::with_posts(vec![sample_post("1", 0, 0)]);
        let mut session = VoteSession::open(sample_post("1", 0, 0), &local);
        block_on(session.cast_vote(Side::B, &local, &repo)).unwrap();

        let form = DemographicsForm {
            gender: Some(Gender::Male),
            age_group: None,
        };
        let result = block_on(session.submit_demographics(&form, &local, &repo));
        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert_eq!(local.demographics(), None);
        assert_eq!(session.pending_side(), Some(Side::B));
        assert_eq!(repo.vote_calls.get(), 0);
    }

    #[test]
    fn remote_failure_leaves_local_state_untouched() {
        let local = LocalState::new(MemoryStore::default());
        local.set_demographics(&profile());
        let repo = FakeRepository::with_posts(vec![sample_post("1", 4, 1)]);
        repo.fail.set(true);
        let mut session = VoteSession::open(sample_post("1", 4, 1), &local);

        let result = block_on(session.cast_vote(Side::A, &local, &repo));
        assert!(matches!(result, Err(ref e) if e.is_retryable()));
        assert!(!session.has_voted());
        assert_eq!(session.post().votes_a, 4);
        assert!(local.voted_posts().is_empty());

        // Retry once the store is back.
        repo.fail.set(false);
        let outcome = block_on(session.cast_vote(Side::A, &local, &repo)).unwrap();
        assert!(matches!(outcome, VoteOutcome::Recorded(ref p) if p.votes_a == 5));
    }

    #[test]
    fn cancelling_demographics_drops_pending_vote() {
        let local = LocalState::new(MemoryStore::default());
        let repo = FakeRepository::with_posts(vec![sample_post("1", 0, 0)]);
        let mut session = VoteSession::open(sample_post("1", 0, 0), &local);
        block_on(session.cast_vote(Side::A, &local, &repo)).unwrap();

        session.cancel_demographics();
        assert_eq!(session.pending_side(), None);

        let resumed =
            block_on(session.submit_demographics(&female_thirties(), &local, &repo)).unwrap();
        assert_eq!(resumed, None);
        assert_eq!(repo.vote_calls.get(), 0);
    }
}
