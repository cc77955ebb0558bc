use std::cell::{Cell, RefCell};

use chrono::{TimeZone, Utc};

use crate::error::{AppError, Result};
use crate::models::{Category, NewPost, Post, PostId, Side};

use super::PostRepository;

/// In-memory repository that counts calls and can be told to fail.
#[derive(Default)]
pub struct FakeRepository {
    pub posts: RefCell<Vec<Post>>,
    pub fail: Cell<bool>,
    pub vote_calls: Cell<usize>,
    pub create_calls: Cell<usize>,
}

impl FakeRepository {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: RefCell::new(posts),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail.get() {
            return Err(AppError::Remote("HTTP 503: unavailable".to_string()));
        }
        Ok(())
    }
}

pub fn sample_post(id: &str, votes_a: u64, votes_b: u64) -> Post {
    Post {
        id: PostId::new(id),
        category: Category::Couple,
        title: "Forgotten anniversary".to_string(),
        story: "He forgot. Again.".to_string(),
        side_a_label: "Wife".to_string(),
        side_b_label: "Husband".to_string(),
        votes_a,
        votes_b,
        search_keywords: Vec::new(),
        created_at: Utc.timestamp_opt(1_767_225_600, 0).single(),
    }
}

impl PostRepository for FakeRepository {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        self.check()?;
        Ok(self.posts.borrow().clone())
    }

    async fn get_post(&self, id: &PostId) -> Result<Post> {
        self.check()?;
        self.posts
            .borrow()
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    async fn increment_vote(&self, id: &PostId, side: Side, current: u64) -> Result<u64> {
        self.vote_calls.set(self.vote_calls.get() + 1);
        self.check()?;
        let mut posts = self.posts.borrow_mut();
        let post = posts
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;
        post.set_votes(side, current + 1);
        Ok(current + 1)
    }

    async fn create_post(&self, new: &NewPost) -> Result<Post> {
        self.create_calls.set(self.create_calls.get() + 1);
        self.check()?;
        let mut posts = self.posts.borrow_mut();
        let post = Post {
            id: PostId::new(format!("{}", posts.len() + 100)),
            category: new.category,
            title: new.title.clone(),
            story: new.story.clone(),
            side_a_label: new.side_a_label.clone(),
            side_b_label: new.side_b_label.clone(),
            votes_a: new.votes_a,
            votes_b: new.votes_b,
            search_keywords: new.search_keywords.clone(),
            created_at: Some(Utc::now()),
        };
        posts.push(post.clone());
        Ok(post)
    }
}
