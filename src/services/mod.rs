#[cfg(test)]
pub mod fake;
pub mod share;
mod supabase;

pub use supabase::SupabaseClient;

use crate::error::Result;
use crate::models::{NewPost, Post, PostId, Side};

/// Remote collection owning the canonical posts and their counters.
#[allow(async_fn_in_trait)]
pub trait PostRepository {
    /// Newest first.
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Fails with `AppError::NotFound` when no post has this id.
    async fn get_post(&self, id: &PostId) -> Result<Post>;

    /// Bumps the counter for `side` starting from the cached `current` value
    /// and returns the stored count afterwards.
    async fn increment_vote(&self, id: &PostId, side: Side, current: u64) -> Result<u64>;

    async fn create_post(&self, post: &NewPost) -> Result<Post>;
}
