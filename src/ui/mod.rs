//! Operator interface logic (no rendering).

pub mod pager;
