use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::{json, Map, Value};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{NewPost, Post, PostId, Side};

use super::PostRepository;

/// PostgREST client for the hosted posts collection.
pub struct SupabaseClient {
    client: Client,
    base_url: Url,
    api_key: String,
    table: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: String, table: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("sidevote/0.1")
            .build()?;

        // Url::join replaces the last segment unless the base ends with '/'
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        Ok(Self {
            client,
            base_url,
            api_key,
            table,
        })
    }

    fn table_url(&self) -> Result<Url> {
        Ok(self.base_url.join(&format!("rest/v1/{}", self.table))?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Conditional update: only applies while the counter still holds `expected`.
    async fn compare_and_increment(
        &self,
        id: &PostId,
        side: Side,
        expected: u64,
    ) -> Result<Option<u64>> {
        let field = side.field();
        let mut url = self.table_url()?;
        let (key, value) = counter_filter(field, expected);
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", id))
            .append_pair(&key, &value);

        let mut body = Map::new();
        body.insert(field.to_string(), json!(expected + 1));

        let response = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        let rows: Vec<Post> = check_status(response).await?.json().await?;
        Ok(rows.first().map(|post| post.votes(side)))
    }
}

impl ConditionalCounter for SupabaseClient {
    async fn try_increment(&self, id: &PostId, side: Side, expected: u64) -> Result<Option<u64>> {
        self.compare_and_increment(id, side, expected).await
    }

    async fn read_votes(&self, id: &PostId, side: Side) -> Result<u64> {
        Ok(self.get_post(id).await?.votes(side))
    }
}

impl PostRepository for SupabaseClient {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");

        let response = self.request(Method::GET, url).send().await?;
        let rows: Vec<Value> = check_status(response).await?.json().await?;
        Ok(decode_rows(rows))
    }

    async fn get_post(&self, id: &PostId) -> Result<Post> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("eq.{}", id));

        let response = self.request(Method::GET, url).send().await?;
        let posts: Vec<Post> = check_status(response).await?.json().await?;

        posts
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    async fn increment_vote(&self, id: &PostId, side: Side, current: u64) -> Result<u64> {
        increment_once(self, id, side, current).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let url = self.table_url()?;

        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(post)
            .send()
            .await?;

        let rows: Vec<Post> = check_status(response).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Remote("No row returned from insert".to_string()))
    }
}

/// Counter update primitives the vote increment is built from.
trait ConditionalCounter {
    /// Applies `expected + 1` only while the stored counter equals `expected`.
    /// `None` means no row matched.
    async fn try_increment(&self, id: &PostId, side: Side, expected: u64) -> Result<Option<u64>>;

    async fn read_votes(&self, id: &PostId, side: Side) -> Result<u64>;
}

/// One conditional update from the cached value. A miss is never retried: the
/// post is re-read only to tell a deleted post from a moved counter.
async fn increment_once<C: ConditionalCounter>(
    counter: &C,
    id: &PostId,
    side: Side,
    current: u64,
) -> Result<u64> {
    if let Some(updated) = counter.try_increment(id, side, current).await? {
        return Ok(updated);
    }

    let stored = counter.read_votes(id, side).await?;
    tracing::warn!(
        "Vote on {} not applied: expected {} votes for {:?}, found {}",
        id,
        current,
        side,
        stored
    );
    Err(AppError::Remote(
        "vote counter changed concurrently, please retry".to_string(),
    ))
}

/// PostgREST filter pinning `field` to `expected`.
fn counter_filter(field: &str, expected: u64) -> (String, String) {
    if expected == 0 {
        // counters created outside this client may still be null
        ("or".to_string(), format!("({field}.eq.0,{field}.is.null)"))
    } else {
        (field.to_string(), format!("eq.{expected}"))
    }
}

/// Decodes list rows one by one so a single malformed row does not hide the rest.
fn decode_rows(rows: Vec<Value>) -> Vec<Post> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<Post>(row) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::warn!("Skipping malformed post row: {}", e);
                None
            }
        })
        .collect()
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response.text().await.unwrap_or_default();
    Err(AppError::Remote(format!("HTTP {}: {}", status, error_text)))
}
