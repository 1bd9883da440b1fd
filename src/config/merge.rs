//! Merge layer for configuration sources.

pub mod merge_policy;
