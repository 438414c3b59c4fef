//! Flutter-facing bindings for the memos core.

pub mod api;
