//! Integration tests for the frame tree editor core

mod error_mapping;
mod import_roundtrip;
mod mini_parser;
mod tree_store;
