//! Memo list filtering.
//!
//! # Responsibility
//! - Narrow hydrated memo lists by title text and required tags.
//!
//! # Invariants
//! - Filtering never reorders or mutates its input.

pub mod filter;
