mod demographics;
mod draft;
mod filter;
mod post;

pub use demographics::{AgeGroup, DemographicsForm, DemographicsProfile, Gender};
pub use draft::{Draft, Field, PostForm};
pub use filter::{CategoryFilter, SortMode};
pub use post::{Category, NewPost, Post, PostId, SeedPost, Side, VoteTally};
