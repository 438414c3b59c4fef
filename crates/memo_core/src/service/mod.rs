//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into presentation-level operations.
//! - Keep FFI/CLI layers decoupled from storage details.

pub mod memo_service;
