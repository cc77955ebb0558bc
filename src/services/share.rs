use crate::models::{Post, PostId};

const TWITTER_INTENT_URL: &str = "https://twitter.com/intent/tweet";
const KAKAO_STORY_SHARE_URL: &str = "https://story.kakao.com/share";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTarget {
    CopyLink,
    Twitter,
    Kakao,
}

pub fn post_url(base_url: &str, id: &PostId) -> String {
    format!("{}/post/{}", base_url.trim_end_matches('/'), id)
}

pub fn share_text(post: &Post) -> String {
    format!("{} - whose side are you on?", post.title)
}

pub fn twitter_intent_url(text: &str, url: &str) -> String {
    format!(
        "{}?text={}&url={}",
        TWITTER_INTENT_URL,
        urlencoding::encode(text),
        urlencoding::encode(url)
    )
}

pub fn kakao_story_url(url: &str) -> String {
    format!("{}?url={}", KAKAO_STORY_SHARE_URL, urlencoding::encode(url))
}

/// Fire-and-forget share of `post`; returns a status line for the user.
pub fn share(target: ShareTarget, post: &Post, base_url: &str) -> String {
    let url = post_url(base_url, &post.id);

    let external = match target {
        ShareTarget::CopyLink => return format!("Link: {url}"),
        ShareTarget::Twitter => twitter_intent_url(&share_text(post), &url),
        ShareTarget::Kakao => kakao_story_url(&url),
    };

    match open::that(&external) {
        Ok(()) => "Opened share page in browser".to_string(),
        Err(e) => {
            tracing::warn!("Failed to open share link {}: {}", external, e);
            format!("Could not open browser. Link: {url}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fake::sample_post;

    #[test]
    fn post_url_ignores_trailing_slash() {
        let id = PostId::new("17");
        assert_eq!(post_url("https://vote.example/", &id), "https://vote.example/post/17");
        assert_eq!(post_url("https://vote.example", &id), "https://vote.example/post/17");
    }

    #[test]
    fn twitter_intent_is_percent_encoded() {
        let url = twitter_intent_url("A & B?", "https://vote.example/post/1");
        assert_eq!(
            url,
            "https://twitter.com/intent/tweet?text=A%20%26%20B%3F&url=https%3A%2F%2Fvote.example%2Fpost%2F1"
        );
    }

    #[test]
    fn kakao_fallback_carries_url() {
        assert_eq!(
            kakao_story_url("https://vote.example/post/1"),
            "https://story.kakao.com/share?url=https%3A%2F%2Fvote.example%2Fpost%2F1"
        );
    }

    #[test]
    fn share_text_uses_title() {
        let post = sample_post("1", 0, 0);
        assert_eq!(share_text(&post), "Forgotten anniversary - whose side are you on?");
    }

    #[test]
    fn copy_link_reports_url_without_launching() {
        let post = sample_post("9", 0, 0);
        assert_eq!(
            share(ShareTarget::CopyLink, &post, "https://vote.example"),
            "Link: https://vote.example/post/9"
        );
    }
}
