use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task::{Category, Draft};

/// Limits are in UTF-16 code units, the unit form fields report.
pub const TITLE_MAX_LEN: usize = 20;
pub const DESCRIPTION_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Category,
    Title,
    Description,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Category => "category",
            Field::Title => "title",
            Field::Description => "description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldError {
    CategoryRequired,
    UnknownCategory,
    TitleRequired,
    TitleTooLong,
    DescriptionRequired,
    DescriptionTooLong,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FieldError::CategoryRequired => "category required",
            FieldError::UnknownCategory => "unknown category",
            FieldError::TitleRequired => "title required",
            FieldError::TitleTooLong => "title too long",
            FieldError::DescriptionRequired => "description required",
            FieldError::DescriptionTooLong => "description too long",
        };
        f.write_str(msg)
    }
}

/// Per-field validation failures. A field that is absent is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<Field, FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.fields.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.fields.iter().map(|(field, err)| (*field, *err))
    }

    /// Field name to display message, in field order.
    pub fn messages(&self) -> BTreeMap<&'static str, String> {
        self.iter()
            .map(|(field, err)| (field.as_str(), err.to_string()))
            .collect()
    }

    fn insert(&mut self, field: Field, err: FieldError) {
        self.fields.insert(field, err);
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, err)| format!("{field}: {err}"))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Checks every field of the draft; no check short-circuits another.
#[tracing::instrument(skip(draft))]
pub fn validate(draft: &Draft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    let title_len = draft.title.encode_utf16().count();
    let description_len = draft.description.encode_utf16().count();

    if draft.category.is_empty() {
        errors.insert(Field::Category, FieldError::CategoryRequired);
    } else if draft.category.parse::<Category>().is_err() {
        errors.insert(Field::Category, FieldError::UnknownCategory);
    }

    if title_len == 0 {
        errors.insert(Field::Title, FieldError::TitleRequired);
    } else if title_len > TITLE_MAX_LEN {
        errors.insert(Field::Title, FieldError::TitleTooLong);
    }

    if description_len == 0 {
        errors.insert(Field::Description, FieldError::DescriptionRequired);
    } else if description_len > DESCRIPTION_MAX_LEN {
        errors.insert(Field::Description, FieldError::DescriptionTooLong);
    }

    if !errors.is_empty() {
        tracing::debug!(
            title_len,
            description_len,
            errors = %errors,
            "draft rejected"
        );
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds_inclusive() {
        for title_len in [1, 20] {
            for description_len in [1, 100] {
                let draft = Draft::new("work", "t".repeat(title_len), "d".repeat(description_len));
                assert!(validate(&draft).is_empty(), "{title_len}/{description_len}");
            }
        }
    }

    #[test]
    fn empty_draft_reports_every_field() {
        let errors = validate(&Draft::default());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(Field::Category), Some(FieldError::CategoryRequired));
        assert_eq!(errors.get(Field::Title), Some(FieldError::TitleRequired));
        assert_eq!(
            errors.get(Field::Description),
            Some(FieldError::DescriptionRequired)
        );
    }

    #[test]
    fn over_length_fields_are_too_long() {
        let draft = Draft::new("personal", "t".repeat(21), "d".repeat(101));
        let errors = validate(&draft);
        assert_eq!(errors.get(Field::Category), None);
        assert_eq!(errors.get(Field::Title), Some(FieldError::TitleTooLong));
        assert_eq!(
            errors.get(Field::Description),
            Some(FieldError::DescriptionTooLong)
        );
    }

    #[test]
    fn length_counts_code_units_not_bytes() {
        let draft = Draft::new("work", "é".repeat(20), "ü".repeat(100));
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn astral_characters_count_twice() {
        let draft = Draft::new("work", "😀".repeat(10), "🚀".repeat(50));
        assert!(validate(&draft).is_empty());

        let draft = Draft::new("work", "😀".repeat(11), "🚀".repeat(51));
        let errors = validate(&draft);
        assert_eq!(errors.get(Field::Title), Some(FieldError::TitleTooLong));
        assert_eq!(
            errors.get(Field::Description),
            Some(FieldError::DescriptionTooLong)
        );
    }

    #[test]
    fn unknown_category_is_a_category_error() {
        let errors = validate(&Draft::new("home", "title", "description"));
        assert_eq!(errors.get(Field::Category), Some(FieldError::UnknownCategory));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn messages_use_field_names() {
        let errors = validate(&Draft::new("", "ok", ""));
        let messages = errors.messages();
        assert_eq!(messages.get("category").map(String::as_str), Some("category required"));
        assert_eq!(
            messages.get("description").map(String::as_str),
            Some("description required")
        );
        assert!(!messages.contains_key("title"));
    }
}
