//! Versioned multi-store synchronization
//!
//! Keeps the relational source of truth, the detail cache, and the search
//! index consistent as content mutates, and answers incremental delta
//! sync requests from client applications.
//!
//! # Write path
//!
//! 1. Mutation lands in the relational store (the only durable step)
//! 2. A resync request is recorded in the outbox
//! 3. The detail view is rebuilt and its completeness evaluated
//! 4. Cache and search index are updated best-effort; failures are
//!    logged and retried by the background drainer
//!
//! # Delta sync
//!
//! Clients poll with `(item_id, version)` pairs and receive full detail
//! views for items strictly newer than reported. Sub-record edits do not
//! bump the parent version and are therefore invisible to this protocol;
//! they still trigger a cache/search resync keyed off the parent id.

mod assembler;
mod outbox;
mod pipeline;
mod resolver;

pub use assembler::DetailAssembler;
pub use outbox::{OutboxEntry, OutboxReason, OutboxRepository};
pub use pipeline::ContentSyncer;
pub use resolver::{DeltaSyncRequest, DeltaSyncResolver, SyncPair};
