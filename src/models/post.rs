use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::draft::PostForm;

/// Opaque identifier assigned by the remote store.
///
/// The store may hand out integer or string keys; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => PostId(n.to_string()),
            RawId::Text(s) => PostId(s),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Couple,
    Friend,
    Work,
    Family,
    Etc,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Couple,
        Category::Friend,
        Category::Work,
        Category::Family,
        Category::Etc,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Couple => "Couple",
            Category::Friend => "Friend",
            Category::Work => "Work",
            Category::Family => "Family",
            Category::Etc => "Etc",
        }
    }

    /// Parses the stored lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "couple" => Some(Category::Couple),
            "friend" => Some(Category::Friend),
            "work" => Some(Category::Work),
            "family" => Some(Category::Family),
            "etc" => Some(Category::Etc),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    /// Column holding this side's counter.
    pub fn field(&self) -> &'static str {
        match self {
            Side::A => "votes_a",
            Side::B => "votes_b",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub category: Category,
    pub title: String,
    pub story: String,
    pub side_a_label: String,
    pub side_b_label: String,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub votes_a: u64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub votes_b: u64,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub search_keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn total_votes(&self) -> u64 {
        self.votes_a + self.votes_b
    }

    pub fn votes(&self, side: Side) -> u64 {
        match side {
            Side::A => self.votes_a,
            Side::B => self.votes_b,
        }
    }

    pub fn set_votes(&mut self, side: Side, count: u64) {
        match side {
            Side::A => self.votes_a = count,
            Side::B => self.votes_b = count,
        }
    }

    pub fn side_label(&self, side: Side) -> &str {
        match side {
            Side::A => &self.side_a_label,
            Side::B => &self.side_b_label,
        }
    }

    /// Milliseconds since the epoch; missing timestamps sort as 0.
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.map(|t| t.timestamp_millis()).unwrap_or(0)
    }

    pub fn tally(&self) -> VoteTally {
        VoteTally::new(self.votes_a, self.votes_b)
    }
}

/// Vote split as shown in the result bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    pub votes_a: u64,
    pub votes_b: u64,
    pub total: u64,
    pub percentage_a: u8,
    pub percentage_b: u8,
}

impl VoteTally {
    pub fn new(votes_a: u64, votes_b: u64) -> Self {
        let total = votes_a + votes_b;
        let percent = |votes: u64| {
            if total == 0 {
                50
            } else {
                ((votes as f64 / total as f64) * 100.0).round() as u8
            }
        };

        Self {
            votes_a,
            votes_b,
            total,
            percentage_a: percent(votes_a),
            percentage_b: percent(votes_b),
        }
    }
}

/// Insert payload for the posts collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    pub category: Category,
    pub title: String,
    pub story: String,
    pub side_a_label: String,
    pub side_b_label: String,
    pub votes_a: u64,
    pub votes_b: u64,
    pub search_keywords: Vec<String>,
}

impl NewPost {
    /// Trimmed copy of a validated form with zeroed counters.
    pub fn from_form(form: &PostForm) -> Self {
        let title = form.title.trim().to_string();
        let story = form.story.trim().to_string();
        let search_keywords = search_keywords(&title, &story);

        Self {
            category: form.category,
            title,
            story,
            side_a_label: form.side_a_label.trim().to_string(),
            side_b_label: form.side_b_label.trim().to_string(),
            votes_a: 0,
            votes_b: 0,
            search_keywords,
        }
    }
}

/// Sample post loaded from a seed file; counters may be pre-populated.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedPost {
    pub category: Category,
    pub title: String,
    pub story: String,
    pub side_a_label: String,
    pub side_b_label: String,
    #[serde(default)]
    pub votes_a: u64,
    #[serde(default)]
    pub votes_b: u64,
}

impl From<SeedPost> for NewPost {
    fn from(seed: SeedPost) -> Self {
        let search_keywords = search_keywords(&seed.title, &seed.story);
        Self {
            category: seed.category,
            title: seed.title,
            story: seed.story,
            side_a_label: seed.side_a_label,
            side_b_label: seed.side_b_label,
            votes_a: seed.votes_a,
            votes_b: seed.votes_b,
            search_keywords,
        }
    }
}

/// Lowercased whitespace tokens of title and story, longer than one character.
pub fn search_keywords(title: &str, story: &str) -> Vec<String> {
    title
        .split_whitespace()
        .chain(story.split_whitespace())
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() > 1)
        .collect()
}

fn zero_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

fn empty_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_datetime))
}

pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // RFC3339 (e.g., "2026-01-11T12:34:56.123+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres timestamp without zone (e.g., "2026-01-11T12:34:56.123456")
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}
