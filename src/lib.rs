//! Lingo Server Library
//!
//! Content-management backend for language-learning exercises. The
//! relational store is authoritative; a TTL detail cache and an FTS5
//! search index are kept in sync by the `sync` module, which also serves
//! the incremental delta-sync protocol for client applications.
//!
//! # Modules
//!
//! - `content`: domain model (items, sub-records, detail views, updates)
//! - `db`: SQLite persistence and repositories
//! - `cache`: injected detail cache abstraction and in-memory impl
//! - `search`: FTS5 index with a completeness facet
//! - `sync`: write-path synchronization, outbox, delta sync resolver
//! - `routes`: axum API surface

pub mod cache;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod routes;
pub mod search;
pub mod state;
pub mod sync;
