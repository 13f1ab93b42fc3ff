//! Field-level item updates
//!
//! A closed tagged enum replaces runtime "field name → value" dispatch:
//! an unrecognized field fails at deserialization, before any mutation is
//! attempted. Applying an update changes exactly one field and bumps the
//! version by 1; validation failures leave the item untouched.

use chrono::Utc;
use serde::Deserialize;

use crate::error::{AppError, Result};

use super::item::ContentItem;

const TOPIC_MAX_LEN: usize = 200;
const INSTRUCTION_MAX_LEN: usize = 2000;
const TIME_LIMIT_MAX_SECS: i64 = 7200;

/// A single-field update, wire shape `{"field": "...", "value": ...}`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate {
    Topic(String),
    Instruction(String),
    TimeLimitSecs(i64),
    /// `null` clears the image reference
    ImageUrl(Option<String>),
    /// `null` clears the audio reference
    AudioUrl(Option<String>),
}

impl FieldUpdate {
    fn validate(&self) -> Result<()> {
        match self {
            FieldUpdate::Topic(v) => {
                if v.trim().is_empty() {
                    return Err(AppError::Validation("topic must not be empty".to_string()));
                }
                if v.chars().count() > TOPIC_MAX_LEN {
                    return Err(AppError::Validation(format!(
                        "topic exceeds {} characters",
                        TOPIC_MAX_LEN
                    )));
                }
            }
            FieldUpdate::Instruction(v) => {
                if v.chars().count() > INSTRUCTION_MAX_LEN {
                    return Err(AppError::Validation(format!(
                        "instruction exceeds {} characters",
                        INSTRUCTION_MAX_LEN
                    )));
                }
            }
            FieldUpdate::TimeLimitSecs(v) => {
                if *v < 1 || *v > TIME_LIMIT_MAX_SECS {
                    return Err(AppError::Validation(format!(
                        "time limit must be between 1 and {} seconds",
                        TIME_LIMIT_MAX_SECS
                    )));
                }
            }
            FieldUpdate::ImageUrl(Some(v)) | FieldUpdate::AudioUrl(Some(v)) => {
                validate_url(v)?;
            }
            FieldUpdate::ImageUrl(None) | FieldUpdate::AudioUrl(None) => {}
        }
        Ok(())
    }
}

fn validate_url(v: &str) -> Result<()> {
    let well_formed = (v.starts_with("http://") || v.starts_with("https://"))
        && v.len() > "https://".len()
        && !v.contains(char::is_whitespace);
    if well_formed {
        Ok(())
    } else {
        Err(AppError::Validation(format!("malformed URL: {}", v)))
    }
}

/// Apply an update to an item, returning the bumped copy
///
/// Pure: no I/O. The caller persists the result with a single UPDATE
/// statement covering all mutable columns plus the new version.
pub fn apply(item: &ContentItem, update: &FieldUpdate) -> Result<ContentItem> {
    update.validate()?;

    let mut next = item.clone();
    match update {
        FieldUpdate::Topic(v) => next.topic = Some(v.clone()),
        FieldUpdate::Instruction(v) => next.instruction = Some(v.clone()),
        FieldUpdate::TimeLimitSecs(v) => next.time_limit_secs = Some(*v),
        FieldUpdate::ImageUrl(v) => next.image_url = v.clone(),
        FieldUpdate::AudioUrl(v) => next.audio_url = v.clone(),
    }
    next.version = item.version + 1;
    next.updated_at = Utc::now().to_rfc3339();
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::item::{ContentKind, CreateItem};

    fn item() -> ContentItem {
        ContentItem::new(
            "item-1".to_string(),
            ContentKind::SentenceCompletion,
            CreateItem {
                kind: ContentKind::SentenceCompletion,
                topic: Some("daily life".to_string()),
                instruction: None,
                time_limit_secs: None,
                image_url: None,
                audio_url: None,
            },
        )
    }

    #[test]
    fn test_version_bumps_by_one_per_update() {
        let mut current = item();
        for n in 1..=5 {
            current = apply(
                &current,
                &FieldUpdate::Instruction(format!("attempt {}", n)),
            )
            .unwrap();
            assert_eq!(current.version, 1 + n);
        }
    }

    #[test]
    fn test_exactly_one_field_changes() {
        let before = item();
        let after = apply(&before, &FieldUpdate::Topic("weather".to_string())).unwrap();

        assert_eq!(after.topic.as_deref(), Some("weather"));
        assert_eq!(after.instruction, before.instruction);
        assert_eq!(after.time_limit_secs, before.time_limit_secs);
        assert_eq!(after.image_url, before.image_url);
        assert_eq!(after.created_at, before.created_at);
    }

    #[test]
    fn test_validation_failure_leaves_item_unchanged() {
        let before = item();

        let err = apply(&before, &FieldUpdate::Topic("   ".to_string())).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(before.version, 1);
        assert_eq!(before.topic.as_deref(), Some("daily life"));

        let err = apply(&before, &FieldUpdate::TimeLimitSecs(0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = apply(
            &before,
            &FieldUpdate::ImageUrl(Some("ftp://example.com/a.png".to_string())),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_url_field_can_be_cleared() {
        let before = apply(
            &item(),
            &FieldUpdate::ImageUrl(Some("https://cdn.example.com/a.png".to_string())),
        )
        .unwrap();
        let after = apply(&before, &FieldUpdate::ImageUrl(None)).unwrap();
        assert!(after.image_url.is_none());
        assert_eq!(after.version, 3);
    }

    #[test]
    fn test_unknown_field_rejected_at_deserialization() {
        let err = serde_json::from_str::<FieldUpdate>(r#"{"field":"difficulty","value":"hard"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_wire_shape() {
        let update: FieldUpdate =
            serde_json::from_str(r#"{"field":"time_limit_secs","value":300}"#).unwrap();
        assert!(matches!(update, FieldUpdate::TimeLimitSecs(300)));
    }
}
