// crates/filters/src/lib.rs
//! Ignore-rule engine for deploy packaging.
#![deny(unsafe_op_in_unsafe_fn, rust_2018_idioms)]
#![deny(warnings)]

pub mod matcher;
pub mod rule;

pub use matcher::{IGNORE_FILE, Matcher};
pub use rule::Rule;
