use crate::error::{Error, Result};
use crate::sql::node::{Pos, SqlNode};
use crate::sql::operator::Monotonicity;
use crate::sql::types::DataType;

/// Name-resolution scope an expression is validated in
pub trait SqlScope {
    /// Resolves a simple field name to its type
    fn resolve_field(&self, name: &str) -> Option<DataType>;

    /// Ordering property of a field within this scope
    fn field_monotonicity(&self, _name: &str) -> Monotonicity {
        Monotonicity::NotMonotonic
    }
}

/// Validation collaborator: derives expression types and manufactures
/// typed, position-carrying validation errors
pub trait SqlValidator {
    fn derive_type(&self, scope: &dyn SqlScope, node: &SqlNode) -> Result<DataType>;

    fn validation_error(&self, pos: Pos, message: &str) -> Error {
        Error::validation(pos, message)
    }
}

/// Validator resolving identifiers through the scope, literals through their
/// type tag, and calls through their operator
pub struct BasicValidator;

impl SqlValidator for BasicValidator {
    fn derive_type(&self, scope: &dyn SqlScope, node: &SqlNode) -> Result<DataType> {
        match node {
            SqlNode::Identifier(id) if id.is_simple() => scope
                .resolve_field(id.simple_name())
                .ok_or_else(|| self.validation_error(id.pos, &format!("unknown field {}", id))),
            SqlNode::Identifier(id) => {
                Err(self.validation_error(id.pos, &format!("unknown field {}", id)))
            }
            SqlNode::Literal(lit) => lit
                .type_name()
                .ok_or_else(|| self.validation_error(lit.pos(), "NULL literal has no type")),
            SqlNode::Call(call) => call.op.derive_type(self, scope, call),
        }
    }
}

/// Simple scope over an insertion-ordered field list
pub struct MapScope {
    fields: Vec<(String, DataType)>,
    monotonic: Vec<(String, Monotonicity)>,
}

impl MapScope {
    pub fn new() -> Self {
        MapScope {
            fields: Vec::new(),
            monotonic: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, datatype: DataType) -> Self {
        self.fields.push((name.into(), datatype));
        self
    }

    pub fn with_monotonic(mut self, name: impl Into<String>, monotonicity: Monotonicity) -> Self {
        self.monotonic.push((name.into(), monotonicity));
        self
    }
}

impl Default for MapScope {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlScope for MapScope {
    fn resolve_field(&self, name: &str) -> Option<DataType> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| *t)
    }

    fn field_monotonicity(&self, name: &str) -> Monotonicity {
        self.monotonic
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| *m)
            .unwrap_or(Monotonicity::NotMonotonic)
    }
}
