//! Domain model for language-learning content
//!
//! A `ContentItem` is the parent aggregate for one exercise, course, or
//! dictionary entry; typed sub-records hang off it by foreign key. The
//! `DetailView` read model combines both and is what the cache, the search
//! index, and sync clients consume.

pub mod completion;
pub mod detail;
pub mod item;
pub mod subrecord;
pub mod update;

pub use completion::Status;
pub use detail::DetailView;
pub use item::{Category, ContentItem, ContentKind, CreateItem};
pub use subrecord::CreateSubRecord;
pub use update::FieldUpdate;
