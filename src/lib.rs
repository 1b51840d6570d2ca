//! RustQL - a SQL planner front-end in Rust
//!
//! This crate provides the front half of a SQL planner:
//! - Expression model (operators, calls, literals) with pluggable
//!   validation, type derivation, and rendering per operator
//! - Dialect-aware unparsing of expression trees back to SQL text
//! - A generic directed dependency graph for cycle detection
//! - View expansion: turning stored view SQL into a relational subtree
//!   coerced to the caller's expected row type
//!
//! Query execution, storage, and the SQL grammar itself are external
//! collaborators; see the traits in `sql::validate` and `sql::plan::view`.

pub mod error;
pub mod graph;
pub mod sql;
