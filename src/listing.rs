use crate::models::{CategoryFilter, Post, SortMode};

/// Filtered, searched and sorted view over `posts`.
///
/// Always derived from scratch; nothing is carried between calls and the
/// source slice is left untouched. Both orderings use a stable sort, so
/// ties keep their input order.
pub fn filter_and_sort<'a>(
    posts: &'a [Post],
    category: CategoryFilter,
    query: &str,
    sort: SortMode,
) -> Vec<&'a Post> {
    let query = query.trim().to_lowercase();

    let mut view: Vec<&Post> = posts
        .iter()
        .filter(|post| category.matches(post.category))
        .filter(|post| {
            query.is_empty()
                || post.title.to_lowercase().contains(&query)
                || post.story.to_lowercase().contains(&query)
        })
        .collect();

    match sort {
        SortMode::Latest => {
            view.sort_by(|a, b| b.created_at_millis().cmp(&a.created_at_millis()))
        }
        SortMode::Popular => view.sort_by(|a, b| b.total_votes().cmp(&a.total_votes())),
    }

    view
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::{Category, PostId};

    fn post(id: &str, category: Category, title: &str, votes: (u64, u64), ts: Option<i64>) -> Post {
        Post {
            id: PostId::new(id),
            category,
            title: title.to_string(),
            story: format!("story of {title}"),
            side_a_label: "A".to_string(),
            side_b_label: "B".to_string(),
            votes_a: votes.0,
            votes_b: votes.1,
            search_keywords: Vec::new(),
            created_at: ts.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
        }
    }

    fn ids(view: &[&Post]) -> Vec<String> {
        view.iter().map(|p| p.id.to_string()).collect()
    }

    fn sample() -> Vec<Post> {
        vec![
            post("1", Category::Couple, "Anniversary dinner", (1, 1), Some(100)),
            post("2", Category::Work, "Meeting Notes", (5, 0), Some(300)),
            post("3", Category::Couple, "Phone check", (0, 2), None),
            post("4", Category::Friend, "Borrowed money", (3, 2), Some(200)),
            post("5", Category::Couple, "Dinner bill", (2, 0), Some(50)),
        ]
    }

    #[test]
    fn all_category_latest_orders_by_time_with_missing_last() {
        let posts = sample();
        let view = filter_and_sort(&posts, CategoryFilter::All, "", SortMode::Latest);
        assert_eq!(ids(&view), ["2", "4", "1", "5", "3"]);
    }

    #[test]
    fn category_filter_keeps_only_matching_posts() {
        let posts = sample();
        let view = filter_and_sort(
            &posts,
            CategoryFilter::Only(Category::Couple),
            "",
            SortMode::Latest,
        );
        assert_eq!(ids(&view), ["1", "5", "3"]);
        assert!(view.iter().all(|p| p.category == Category::Couple));
    }

    #[test]
    fn query_is_trimmed_and_case_insensitive_substring() {
        let posts = sample();
        let view = filter_and_sort(&posts, CategoryFilter::All, "  DINNER ", SortMode::Latest);
        assert_eq!(ids(&view), ["1", "5"]);

        let view = filter_and_sort(&posts, CategoryFilter::All, "ting no", SortMode::Latest);
        assert_eq!(ids(&view), ["2"]);
    }

    #[test]
    fn query_matches_story_text() {
        let posts = sample();
        let view = filter_and_sort(&posts, CategoryFilter::All, "story of phone", SortMode::Latest);
        assert_eq!(ids(&view), ["3"]);
    }

    #[test]
    fn whitespace_query_keeps_everything() {
        let posts = sample();
        let view = filter_and_sort(&posts, CategoryFilter::All, "   ", SortMode::Popular);
        assert_eq!(view.len(), posts.len());
    }

    #[test]
    fn popular_is_stable_on_ties() {
        let posts = sample();
        let view = filter_and_sort(&posts, CategoryFilter::All, "", SortMode::Popular);
        // totals: 1→2, 2→5, 3→2, 4→5, 5→2
        assert_eq!(ids(&view), ["2", "4", "1", "3", "5"]);
    }

    #[test]
    fn combined_filters_and_source_untouched() {
        let posts = sample();
        let before = posts.clone();
        let view = filter_and_sort(
            &posts,
            CategoryFilter::Only(Category::Couple),
            "dinner",
            SortMode::Popular,
        );
        assert_eq!(ids(&view), ["1", "5"]);
        assert_eq!(posts, before);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let posts = sample();
        let first = ids(&filter_and_sort(&posts, CategoryFilter::All, "e", SortMode::Popular));
        let second = ids(&filter_and_sort(&posts, CategoryFilter::All, "e", SortMode::Popular));
        assert_eq!(first, second);
    }

    #[test]
    fn no_match_yields_empty_view() {
        let posts = sample();
        let view = filter_and_sort(
            &posts,
            CategoryFilter::Only(Category::Family),
            "",
            SortMode::Latest,
        );
        assert!(view.is_empty());
    }
}
