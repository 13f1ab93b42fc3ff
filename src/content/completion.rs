//! Completeness evaluation
//!
//! An item is complete when it carries enough sub-records to be served to
//! learners. Pure function of the assembled view.

use serde::{Deserialize, Serialize};

use super::detail::DetailView;
use super::item::ContentKind;

/// Completeness facet, also used as the cache key segment and search facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Complete,
    Uncomplete,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Complete => "complete",
            Status::Uncomplete => "uncomplete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "complete" => Some(Status::Complete),
            "uncomplete" => Some(Status::Uncomplete),
            _ => None,
        }
    }

    /// The other facet value
    pub fn opposite(&self) -> Self {
        match self {
            Status::Complete => Status::Uncomplete,
            Status::Uncomplete => Status::Complete,
        }
    }

    /// Evaluate the completeness of an assembled view
    pub fn of(view: &DetailView) -> Self {
        if is_complete(view) {
            Status::Complete
        } else {
            Status::Uncomplete
        }
    }
}

/// Minimum-cardinality rules per kind
///
/// The multi-part listening kind is complete as soon as any of its variant
/// collections is populated; unrelated slots are always ignored.
pub fn is_complete(view: &DetailView) -> bool {
    match view.item.kind {
        ContentKind::FillInTheBlank => !view.blanks.is_empty(),
        ContentKind::MultipleChoice => !view.choices.is_empty(),
        ContentKind::TrueFalse => !view.true_false.is_empty(),
        ContentKind::Listening => {
            !view.blanks.is_empty() || !view.choices.is_empty() || !view.pairs.is_empty()
        }
        ContentKind::Reading => !view.choices.is_empty(),
        ContentKind::Speaking => !view.sentences.is_empty(),
        ContentKind::SentenceCompletion => !view.sentences.is_empty(),
        ContentKind::Essay => !view.essays.is_empty(),
        ContentKind::Course => !view.lessons.is_empty(),
        ContentKind::DictionaryEntry => !view.senses.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::item::{ContentItem, CreateItem};
    use crate::content::subrecord::{ChoiceRecord, MatchingRecord, SentenceRecord};

    fn view(kind: ContentKind) -> DetailView {
        let item = ContentItem::new(
            "item-1".to_string(),
            kind,
            CreateItem {
                kind,
                topic: None,
                instruction: None,
                time_limit_secs: None,
                image_url: None,
                audio_url: None,
            },
        );
        DetailView::empty(item)
    }

    fn sentence(item_id: &str) -> SentenceRecord {
        SentenceRecord {
            id: "s-1".to_string(),
            item_id: item_id.to_string(),
            prompt: "Complete the sentence".to_string(),
            reference_answer: None,
            position: 0,
        }
    }

    #[test]
    fn test_empty_view_is_uncomplete() {
        for kind in [
            ContentKind::FillInTheBlank,
            ContentKind::Listening,
            ContentKind::SentenceCompletion,
            ContentKind::Course,
        ] {
            assert_eq!(Status::of(&view(kind)), Status::Uncomplete);
        }
    }

    #[test]
    fn test_sentence_completion_completes_with_one_sentence() {
        let mut v = view(ContentKind::SentenceCompletion);
        v.sentences.push(sentence("item-1"));
        assert_eq!(Status::of(&v), Status::Complete);
    }

    #[test]
    fn test_listening_completes_with_any_variant() {
        let mut v = view(ContentKind::Listening);
        assert_eq!(Status::of(&v), Status::Uncomplete);

        v.pairs.push(MatchingRecord {
            id: "p-1".to_string(),
            item_id: "item-1".to_string(),
            left_text: "dog".to_string(),
            right_text: "perro".to_string(),
            position: 0,
        });
        assert_eq!(Status::of(&v), Status::Complete);
    }

    #[test]
    fn test_unrelated_slots_are_ignored() {
        // An essay item with only choice records stays uncomplete
        let mut v = view(ContentKind::Essay);
        v.choices.push(ChoiceRecord {
            id: "c-1".to_string(),
            item_id: "item-1".to_string(),
            question: "Pick one".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_index: 0,
            position: 0,
        });
        assert_eq!(Status::of(&v), Status::Uncomplete);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let mut v = view(ContentKind::Speaking);
        v.sentences.push(sentence("item-1"));
        assert_eq!(Status::of(&v), Status::of(&v));
    }
}
