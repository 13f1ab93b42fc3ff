//! Assembled read model for a content item
//!
//! Never the source of truth: rebuilt from the relational store on demand,
//! cached and indexed as an optimization.

use serde::{Deserialize, Serialize};

use super::item::ContentItem;
use super::subrecord::{
    BlankRecord, ChoiceRecord, EssayRecord, LessonRecord, MatchingRecord, SenseRecord,
    SentenceRecord, TrueFalseRecord,
};

/// Content item plus all of its current sub-records
///
/// Only the slots matching the item's kind are populated; the rest stay
/// empty and are omitted from the serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    #[serde(flatten)]
    pub item: ContentItem,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blanks: Vec<BlankRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub true_false: Vec<TrueFalseRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<MatchingRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sentences: Vec<SentenceRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub essays: Vec<EssayRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lessons: Vec<LessonRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub senses: Vec<SenseRecord>,
}

impl DetailView {
    /// An empty view around an item, slots to be filled by the assembler
    pub fn empty(item: ContentItem) -> Self {
        Self {
            item,
            blanks: Vec::new(),
            choices: Vec::new(),
            true_false: Vec::new(),
            pairs: Vec::new(),
            sentences: Vec::new(),
            essays: Vec::new(),
            lessons: Vec::new(),
            senses: Vec::new(),
        }
    }

    /// All searchable sub-record text, flattened for indexing
    pub fn body_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for b in &self.blanks {
            parts.push(&b.question);
            parts.push(&b.answer);
        }
        for c in &self.choices {
            parts.push(&c.question);
            for o in &c.options {
                parts.push(o);
            }
        }
        for t in &self.true_false {
            parts.push(&t.statement);
            if let Some(e) = &t.explanation {
                parts.push(e);
            }
        }
        for p in &self.pairs {
            parts.push(&p.left_text);
            parts.push(&p.right_text);
        }
        for s in &self.sentences {
            parts.push(&s.prompt);
            if let Some(a) = &s.reference_answer {
                parts.push(a);
            }
        }
        for e in &self.essays {
            parts.push(&e.prompt);
        }
        for l in &self.lessons {
            parts.push(&l.title);
            if let Some(b) = &l.body {
                parts.push(b);
            }
        }
        for s in &self.senses {
            parts.push(&s.definition);
            if let Some(e) = &s.example {
                parts.push(e);
            }
        }
        parts.join(" ")
    }
}
