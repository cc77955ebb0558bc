use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::post::Category;
use crate::error::{AppError, Result};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_STORY_LEN: usize = 5000;
pub const MAX_LABEL_LEN: usize = 20;

/// Form fields that can fail validation or hold input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Category,
    Story,
    SideALabel,
    SideBLabel,
    Gender,
    AgeGroup,
}

impl Field {
    /// Focus order of the authoring form.
    pub const COMPOSE: [Field; 5] = [
        Field::Title,
        Field::Category,
        Field::Story,
        Field::SideALabel,
        Field::SideBLabel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Category => "Category",
            Field::Story => "Story",
            Field::SideALabel => "Side A",
            Field::SideBLabel => "Side B",
            Field::Gender => "Gender",
            Field::AgeGroup => "Age group",
        }
    }

    pub fn max_len(&self) -> Option<usize> {
        match self {
            Field::Title => Some(MAX_TITLE_LEN),
            Field::Story => Some(MAX_STORY_LEN),
            Field::SideALabel | Field::SideBLabel => Some(MAX_LABEL_LEN),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Category => "category",
            Field::Story => "story",
            Field::SideALabel => "side_a_label",
            Field::SideBLabel => "side_b_label",
            Field::Gender => "gender",
            Field::AgeGroup => "ageGroup",
        };
        f.write_str(name)
    }
}

/// In-progress authoring form.
///
/// Stored drafts are read field by field: a null or unknown value falls back
/// to the empty form's value instead of dropping the whole draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostForm {
    #[serde(deserialize_with = "text_or_empty")]
    pub title: String,
    #[serde(deserialize_with = "category_or_default")]
    pub category: Category,
    #[serde(deserialize_with = "text_or_empty")]
    pub story: String,
    #[serde(deserialize_with = "text_or_empty")]
    pub side_a_label: String,
    #[serde(deserialize_with = "text_or_empty")]
    pub side_b_label: String,
}

impl PostForm {
    /// Drafts are only worth keeping once there is a title or a story.
    pub fn has_content(&self) -> bool {
        !self.title.is_empty() || !self.story.is_empty()
    }

    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Title => Some(&mut self.title),
            Field::Story => Some(&mut self.story),
            Field::SideALabel => Some(&mut self.side_a_label),
            Field::SideBLabel => Some(&mut self.side_b_label),
            _ => None,
        }
    }

    /// Checks every field in form order and reports the first failure.
    pub fn validate(&self) -> Result<()> {
        check_text(Field::Title, &self.title, "Please enter a title")?;
        check_text(Field::Story, &self.story, "Please tell the story")?;
        check_text(
            Field::SideALabel,
            &self.side_a_label,
            "Please label both sides",
        )?;
        check_text(
            Field::SideBLabel,
            &self.side_b_label,
            "Please label both sides",
        )?;
        Ok(())
    }
}

fn check_text(field: Field, value: &str, missing: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(field, missing));
    }
    if let Some(max) = field.max_len() {
        if trimmed.chars().count() > max {
            return Err(AppError::validation(
                field,
                format!("{} must be at most {} characters", field.label(), max),
            ));
        }
    }
    Ok(())
}

fn text_or_empty<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn category_or_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Category, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(Category::from_name)
        .unwrap_or_default())
}

/// Autosaved copy of the authoring form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(flatten)]
    pub form: PostForm,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> PostForm {
        PostForm {
            title: "Birthday".to_string(),
            category: Category::Couple,
            story: "Forgot it again".to_string(),
            side_a_label: "Me".to_string(),
            side_b_label: "Partner".to_string(),
        }
    }

    fn failed_field(form: &PostForm) -> Field {
        match form.validate() {
            Err(AppError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn filled_form_passes() {
        assert!(filled().validate().is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let form = PostForm {
            title: "   ".to_string(),
            ..filled()
        };
        assert_eq!(failed_field(&form), Field::Title);
    }

    #[test]
    fn overlong_story_is_rejected() {
        let form = PostForm {
            story: "x".repeat(MAX_STORY_LEN + 1),
            ..filled()
        };
        assert_eq!(failed_field(&form), Field::Story);
    }

    #[test]
    fn label_length_counts_characters_after_trim() {
        let form = PostForm {
            side_b_label: format!("  {}  ", "가".repeat(MAX_LABEL_LEN)),
            ..filled()
        };
        assert!(form.validate().is_ok());

        let form = PostForm {
            side_b_label: "가".repeat(MAX_LABEL_LEN + 1),
            ..filled()
        };
        assert_eq!(failed_field(&form), Field::SideBLabel);
    }

    #[test]
    fn missing_side_a_is_reported_before_side_b() {
        let form = PostForm {
            side_a_label: String::new(),
            side_b_label: String::new(),
            ..filled()
        };
        assert_eq!(failed_field(&form), Field::SideALabel);
    }

    #[test]
    fn empty_form_has_no_content() {
        assert!(!PostForm::default().has_content());
        let form = PostForm {
            story: "s".to_string(),
            ..PostForm::default()
        };
        assert!(form.has_content());
    }

    #[test]
    fn draft_uses_flat_camel_case_layout() {
        let raw = r#"{"title":"t","story":"s","category":"friend","savedAt":"2026-05-01T08:00:00Z"}"#;
        let draft: Draft = serde_json::from_str(raw).unwrap();
        assert_eq!(draft.form.title, "t");
        assert_eq!(draft.form.category, Category::Friend);
        assert_eq!(draft.form.side_a_label, "");

        let value = serde_json::to_value(&draft).unwrap();
        assert!(value.get("savedAt").is_some());
        assert_eq!(value["side_b_label"], "");
    }

    #[test]
    fn draft_fields_fall_back_individually() {
        let raw = r#"{"title":null,"story":"kept","category":"school","side_a_label":null,"savedAt":"2026-05-01T08:00:00Z"}"#;
        let draft: Draft = serde_json::from_str(raw).unwrap();
        assert_eq!(draft.form.title, "");
        assert_eq!(draft.form.story, "kept");
        assert_eq!(draft.form.category, Category::Couple);
        assert_eq!(draft.form.side_a_label, "");
    }
}
