use std::fmt::{self, Display};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sql::literal::SqlLiteral;
use crate::sql::operator::{Monotonicity, SqlOperator};
use crate::sql::validate::{SqlScope, SqlValidator};
use crate::sql::write::{Dialect, SqlTextWriter, SqlWriter};

/// Source position of a node, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub const ZERO: Pos = Pos { line: 0, column: 0 };

    pub fn new(line: u32, column: u32) -> Self {
        Pos { line, column }
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A possibly-qualified identifier such as `a` or `s.t.a`
#[derive(Debug, Clone, PartialEq)]
pub struct SqlIdentifier {
    pub names: Vec<String>,
    pub pos: Pos,
}

impl SqlIdentifier {
    pub fn simple(name: impl Into<String>, pos: Pos) -> Self {
        SqlIdentifier {
            names: vec![name.into()],
            pos,
        }
    }

    pub fn qualified(names: Vec<String>, pos: Pos) -> Self {
        SqlIdentifier { names, pos }
    }

    /// Whether this identifier is a single unqualified name
    pub fn is_simple(&self) -> bool {
        self.names.len() == 1
    }

    pub fn simple_name(&self) -> &str {
        &self.names[0]
    }
}

impl Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join("."))
    }
}

/// An operator applied to an ordered sequence of operand expressions
#[derive(Clone)]
pub struct SqlCall {
    pub op: Arc<dyn SqlOperator>,
    pub operands: Vec<SqlNode>,
    pub pos: Pos,
}

impl SqlCall {
    pub fn new(op: Arc<dyn SqlOperator>, operands: Vec<SqlNode>, pos: Pos) -> Self {
        SqlCall { op, operands, pos }
    }

    pub fn operand(&self, index: usize) -> &SqlNode {
        &self.operands[index]
    }

    /// Checks the operand count against the operator's declared constraint.
    /// A violation is a caller bug, not user input, so it surfaces as an
    /// internal error.
    pub fn check_operand_count(&self) -> Result<()> {
        let range = self.op.def().operands;
        if range.accepts(self.operands.len()) {
            return Ok(());
        }
        Err(Error::Internal(format!(
            "operator {} got {} operands, expected {}",
            self.op.name(),
            self.operands.len(),
            range
        )))
    }
}

impl fmt::Debug for SqlCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlCall")
            .field("op", &self.op.name())
            .field("operands", &self.operands)
            .field("pos", &self.pos)
            .finish()
    }
}

impl PartialEq for SqlCall {
    fn eq(&self, other: &Self) -> bool {
        self.op.name() == other.op.name() && self.operands == other.operands
    }
}

/// A node in the SQL expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum SqlNode {
    Identifier(SqlIdentifier),
    Literal(SqlLiteral),
    Call(SqlCall),
}

impl SqlNode {
    pub fn pos(&self) -> Pos {
        match self {
            SqlNode::Identifier(id) => id.pos,
            SqlNode::Literal(lit) => lit.pos(),
            SqlNode::Call(call) => call.pos,
        }
    }

    /// Produces a value-identical node tagged with a new source position.
    /// Operands of a call keep their own positions.
    pub fn clone_at(&self, pos: Pos) -> SqlNode {
        match self {
            SqlNode::Identifier(id) => SqlNode::Identifier(SqlIdentifier {
                names: id.names.clone(),
                pos,
            }),
            SqlNode::Literal(lit) => SqlNode::Literal(lit.clone_at(pos)),
            SqlNode::Call(call) => SqlNode::Call(SqlCall {
                op: call.op.clone(),
                operands: call.operands.clone(),
                pos,
            }),
        }
    }

    /// Renders the node as SQL text, inserting parentheses only where the
    /// surrounding precedence requires them. The parens decision is made
    /// here, outside any operator override, so every operator's renderer
    /// inherits it.
    pub fn unparse(&self, writer: &mut dyn SqlWriter, left_prec: u8, right_prec: u8) {
        match self {
            SqlNode::Identifier(id) => writer.identifier(&id.to_string()),
            SqlNode::Literal(lit) => lit.unparse(writer, left_prec, right_prec),
            SqlNode::Call(call) => {
                if left_prec > call.op.left_prec() || right_prec > call.op.right_prec() {
                    let frame = writer.start_list("(", ")");
                    call.op.unparse(writer, call, 0, 0);
                    writer.end_list(frame);
                } else {
                    call.op.unparse(writer, call, left_prec, right_prec);
                }
            }
        }
    }

    /// Convenience rendering of the whole node with no outer precedence
    pub fn to_sql_string(&self, dialect: Dialect) -> String {
        let mut writer = SqlTextWriter::new(dialect);
        self.unparse(&mut writer, 0, 0);
        writer.into_sql()
    }

    /// Validates this node as an expression in the given scope
    pub fn validate_expr(&self, validator: &dyn SqlValidator, scope: &dyn SqlScope) -> Result<()> {
        match self {
            SqlNode::Identifier(_) => validator.derive_type(scope, self).map(|_| ()),
            SqlNode::Literal(_) => Ok(()),
            SqlNode::Call(call) => call.op.validate_call(call, validator, scope, scope),
        }
    }

    /// Ordering/monotonicity property of this expression within a scope
    pub fn monotonicity(&self, scope: &dyn SqlScope) -> Monotonicity {
        match self {
            SqlNode::Identifier(id) if id.is_simple() => {
                scope.field_monotonicity(id.simple_name())
            }
            SqlNode::Identifier(_) => Monotonicity::NotMonotonic,
            SqlNode::Literal(_) => Monotonicity::Constant,
            SqlNode::Call(call) => call.op.monotonicity(call, scope),
        }
    }

    /// Walks the tree. With `only_expressions` set, operators may suppress
    /// traversal into operands that are not expressions (e.g. alias names).
    pub fn accept(&self, visitor: &mut dyn SqlVisitor, only_expressions: bool) {
        visitor.visit(self);
        if let SqlNode::Call(call) = self {
            let mut handler = CallArgHandler { only_expressions };
            call.op
                .accept_call(visitor, call, only_expressions, &mut handler);
        }
    }
}

impl Display for SqlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_string(Dialect::Ansi))
    }
}

impl From<SqlIdentifier> for SqlNode {
    fn from(value: SqlIdentifier) -> Self {
        Self::Identifier(value)
    }
}

impl From<SqlLiteral> for SqlNode {
    fn from(value: SqlLiteral) -> Self {
        Self::Literal(value)
    }
}

impl From<SqlCall> for SqlNode {
    fn from(value: SqlCall) -> Self {
        Self::Call(value)
    }
}

/// Generic expression-tree visitor
pub trait SqlVisitor {
    fn visit(&mut self, node: &SqlNode);
}

/// Controls how a call's operands are handed to a visitor
pub trait ArgHandler {
    fn visit_child(&mut self, visitor: &mut dyn SqlVisitor, ordinal: usize, operand: &SqlNode);
}

/// Default handler: recurse into the operand with the same traversal mode
struct CallArgHandler {
    only_expressions: bool,
}

impl ArgHandler for CallArgHandler {
    fn visit_child(&mut self, visitor: &mut dyn SqlVisitor, _ordinal: usize, operand: &SqlNode) {
        operand.accept(visitor, self.only_expressions);
    }
}
