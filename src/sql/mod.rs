//! SQL planning module
//!
//! This module provides:
//! - `types`: SQL data types, row types, and the type factory
//! - `node`: expression tree nodes (identifiers, literals, calls)
//! - `operator`: the extensible SQL operator abstraction
//! - `literal`: typed constant values with dialect-aware rendering
//! - `write`: SQL text rendering (writer and dialects)
//! - `validate`: validator and scope collaborator traits
//! - `plan`: relational plan nodes, row-type coercion, view expansion

pub mod literal;
pub mod node;
pub mod operator;
pub mod plan;
pub mod types;
pub mod validate;
pub mod write;
