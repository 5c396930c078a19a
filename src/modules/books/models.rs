use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use sqlx::FromRow;

/// Maximum length for `title` and `author`.
pub const MAX_TEXT_LEN: usize = 255;

/// Persisted Book record as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    /// Store-assigned identifier, immutable after creation
    pub id: i64,
    pub title: String,
    pub author: String,
    pub price: i64,
    pub description: Option<String>,
}

/// Request body for creating a book. Never carries `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookCreate {
    pub title: String,
    pub author: String,
    pub price: i64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update payload. Fields left out of the request body stay `None`
/// and the stored values are preserved.
///
/// `description` is doubly optional so that an explicit `"description": null`
/// (clear the column) is distinguishable from the key being absent (keep the
/// current value).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

/// Confirmation body for delete responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl BookCreate {
    /// Check length bounds, collecting one detail entry per offending field.
    pub fn validate(&self) -> Result<(), Vec<serde_json::Value>> {
        let mut details = Vec::new();
        if self.title.chars().count() > MAX_TEXT_LEN {
            details.push(length_error("title"));
        }
        if self.author.chars().count() > MAX_TEXT_LEN {
            details.push(length_error("author"));
        }
        if details.is_empty() {
            Ok(())
        } else {
            Err(details)
        }
    }
}

impl BookPatch {
    /// True when no field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.price.is_none()
            && self.description.is_none()
    }

    /// Check length bounds on the fields that were supplied.
    pub fn validate(&self) -> Result<(), Vec<serde_json::Value>> {
        let mut details = Vec::new();
        if let Some(title) = &self.title {
            if title.chars().count() > MAX_TEXT_LEN {
                details.push(length_error("title"));
            }
        }
        if let Some(author) = &self.author {
            if author.chars().count() > MAX_TEXT_LEN {
                details.push(length_error("author"));
            }
        }
        if details.is_empty() {
            Ok(())
        } else {
            Err(details)
        }
    }
}

fn length_error(field: &str) -> serde_json::Value {
    json!({
        "field": field,
        "error": format!("must be at most {MAX_TEXT_LEN} characters"),
    })
}

/// Deserializes a present key into `Some(inner)`, letting `#[serde(default)]`
/// produce the outer `None` when the key is absent.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_absent_from_null_description() {
        let absent: BookPatch = serde_json::from_str(r#"{"price": 5}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: BookPatch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: BookPatch = serde_json::from_str(r#"{"description": "dystopia"}"#).unwrap();
        assert_eq!(set.description, Some(Some("dystopia".to_string())));
    }

    #[test]
    fn empty_patch_is_detected() {
        let patch: BookPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());

        let patch: BookPatch = serde_json::from_str(r#"{"title": "1984"}"#).unwrap();
        assert!(!patch.is_empty());
    }

    #[test]
    fn create_rejects_overlong_fields() {
        let input = BookCreate {
            title: "t".repeat(MAX_TEXT_LEN + 1),
            author: "a".to_string(),
            price: 10,
            description: None,
        };
        let details = input.validate().unwrap_err();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0]["field"], "title");
    }

    #[test]
    fn create_accepts_boundary_and_permissive_values() {
        // 255 characters, empty strings, and negative prices all pass.
        let input = BookCreate {
            title: "t".repeat(MAX_TEXT_LEN),
            author: String::new(),
            price: -3,
            description: None,
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn patch_validates_only_supplied_fields() {
        let patch = BookPatch {
            author: Some("a".repeat(MAX_TEXT_LEN + 1)),
            ..BookPatch::default()
        };
        let details = patch.validate().unwrap_err();
        assert_eq!(details[0]["field"], "author");

        assert!(BookPatch::default().validate().is_ok());
    }
}
