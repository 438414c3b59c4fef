//! Derived read views over the memo and tag repositories.

pub mod join;
