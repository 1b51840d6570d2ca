use std::fmt::{self, Display};

use crate::error::Result;
use crate::sql::node::{ArgHandler, SqlCall, SqlNode, SqlVisitor};
use crate::sql::types::DataType;
use crate::sql::validate::{SqlScope, SqlValidator};
use crate::sql::write::SqlWriter;

/// Ordering property an expression propagates from its inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monotonicity {
    NotMonotonic,
    Increasing,
    Decreasing,
    Constant,
}

/// Syntactic kind tag of an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlKind {
    As,
    Equals,
    Other,
}

/// Constraint on how many operands a call may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandCountRange {
    pub min: usize,
    pub max: Option<usize>,
}

impl OperandCountRange {
    pub const fn exactly(n: usize) -> Self {
        OperandCountRange {
            min: n,
            max: Some(n),
        }
    }

    pub const fn at_least(n: usize) -> Self {
        OperandCountRange { min: n, max: None }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

impl Display for OperandCountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Strategy for inferring a call's result type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnTypeStrategy {
    /// The call's type is the first operand's type, unmodified
    FirstOperand,
    /// The call always has this type
    Fixed(DataType),
}

/// Strategy for checking operand types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandCheckStrategy {
    /// Any operand types, as long as each operand has a derivable type
    Any,
}

/// Immutable operator descriptor. Precedence and operand-count constraints
/// are fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct OperatorDef {
    pub name: &'static str,
    pub kind: SqlKind,
    pub prec: u8,
    pub left_assoc: bool,
    pub operands: OperandCountRange,
    pub return_type: ReturnTypeStrategy,
    pub operand_check: OperandCheckStrategy,
}

/// A named SQL syntactic construct with pluggable parse-precedence,
/// validation, type-derivation, rendering, and monotonicity behavior.
///
/// Concrete operators override only the methods whose defaults don't fit;
/// everything else dispatches through the descriptor.
pub trait SqlOperator: Send + Sync {
    fn def(&self) -> &OperatorDef;

    fn name(&self) -> &'static str {
        self.def().name
    }

    fn kind(&self) -> SqlKind {
        self.def().kind
    }

    /// Precedence this operator exerts on its left side
    fn left_prec(&self) -> u8 {
        let def = self.def();
        if def.left_assoc { def.prec } else { def.prec + 1 }
    }

    /// Precedence this operator exerts on its right side
    fn right_prec(&self) -> u8 {
        let def = self.def();
        if def.left_assoc { def.prec + 1 } else { def.prec }
    }

    /// Renders the call. Default: infix for binary calls, function-call
    /// syntax otherwise. Parenthesization of the call itself is decided by
    /// `SqlNode::unparse` before dispatching here; renderers only pass
    /// their own precedences down to their operands.
    fn unparse(&self, writer: &mut dyn SqlWriter, call: &SqlCall, left_prec: u8, right_prec: u8) {
        if call.operands.len() == 2 {
            call.operand(0).unparse(writer, left_prec, self.left_prec());
            writer.keyword(self.name());
            call.operand(1).unparse(writer, self.right_prec(), right_prec);
        } else {
            writer.identifier(self.name());
            let frame = writer.start_list("(", ")");
            for (i, operand) in call.operands.iter().enumerate() {
                if i > 0 {
                    writer.sep(",");
                }
                operand.unparse(writer, 0, 0);
            }
            writer.end_list(frame);
        }
    }

    /// Validates the call's operands. Default: check the operand-count
    /// constraint, then validate every operand as an expression in the
    /// operand scope.
    fn validate_call(
        &self,
        call: &SqlCall,
        validator: &dyn SqlValidator,
        _scope: &dyn SqlScope,
        operand_scope: &dyn SqlScope,
    ) -> Result<()> {
        call.check_operand_count()?;
        for operand in &call.operands {
            operand.validate_expr(validator, operand_scope)?;
        }
        Ok(())
    }

    /// Computes the call's result type via the descriptor's strategies
    fn derive_type(
        &self,
        validator: &dyn SqlValidator,
        scope: &dyn SqlScope,
        call: &SqlCall,
    ) -> Result<DataType> {
        call.check_operand_count()?;
        match self.def().operand_check {
            OperandCheckStrategy::Any => {
                for operand in &call.operands {
                    validator.derive_type(scope, operand)?;
                }
            }
        }
        match self.def().return_type {
            ReturnTypeStrategy::FirstOperand => validator.derive_type(scope, call.operand(0)),
            ReturnTypeStrategy::Fixed(datatype) => Ok(datatype),
        }
    }

    /// Hands the call's operands to a visitor. Default: visit every operand.
    fn accept_call(
        &self,
        visitor: &mut dyn SqlVisitor,
        call: &SqlCall,
        _only_expressions: bool,
        arg_handler: &mut dyn ArgHandler,
    ) {
        for (i, operand) in call.operands.iter().enumerate() {
            arg_handler.visit_child(visitor, i, operand);
        }
    }

    /// Ordering property the call propagates. Default: none.
    fn monotonicity(&self, _call: &SqlCall, _scope: &dyn SqlScope) -> Monotonicity {
        Monotonicity::NotMonotonic
    }
}

/// The `AS` operator: associates an expression with an alias, plus optional
/// column aliases (`expr AS t (c1, c2)`)
pub struct AsOperator {
    def: OperatorDef,
}

impl AsOperator {
    pub fn new() -> Self {
        AsOperator {
            def: OperatorDef {
                name: "AS",
                kind: SqlKind::As,
                prec: 20,
                left_assoc: true,
                operands: OperandCountRange::at_least(2),
                return_type: ReturnTypeStrategy::FirstOperand,
                operand_check: OperandCheckStrategy::Any,
            },
        }
    }
}

impl Default for AsOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlOperator for AsOperator {
    fn def(&self) -> &OperatorDef {
        &self.def
    }

    fn unparse(&self, writer: &mut dyn SqlWriter, call: &SqlCall, left_prec: u8, right_prec: u8) {
        let frame = writer.start_list("", "");
        call.operand(0).unparse(writer, left_prec, self.left_prec());
        writer.keyword("AS");
        call.operand(1).unparse(writer, self.right_prec(), right_prec);
        if call.operands.len() > 2 {
            let list = writer.start_list("(", ")");
            for (i, operand) in call.operands[2..].iter().enumerate() {
                if i > 0 {
                    writer.sep(",");
                }
                operand.unparse(writer, 0, 0);
            }
            writer.end_list(list);
        }
        writer.end_list(frame);
    }

    /// The base method validates all operands. Overridden because the alias
    /// is a name, not an expression: it must be a simple identifier.
    fn validate_call(
        &self,
        call: &SqlCall,
        validator: &dyn SqlValidator,
        scope: &dyn SqlScope,
        _operand_scope: &dyn SqlScope,
    ) -> Result<()> {
        call.check_operand_count()?;
        call.operand(0).validate_expr(validator, scope)?;
        for operand in &call.operands[1..] {
            match operand {
                SqlNode::Identifier(id) if id.is_simple() => {}
                other => {
                    return Err(
                        validator.validation_error(other.pos(), "alias must be a simple identifier")
                    );
                }
            }
        }
        Ok(())
    }

    /// Never try to derive a type for the alias name
    fn derive_type(
        &self,
        validator: &dyn SqlValidator,
        scope: &dyn SqlScope,
        call: &SqlCall,
    ) -> Result<DataType> {
        call.check_operand_count()?;
        validator.derive_type(scope, call.operand(0))
    }

    fn accept_call(
        &self,
        visitor: &mut dyn SqlVisitor,
        call: &SqlCall,
        only_expressions: bool,
        arg_handler: &mut dyn ArgHandler,
    ) {
        if only_expressions {
            // The alias (and any column aliases) are not expressions
            arg_handler.visit_child(visitor, 0, call.operand(0));
        } else {
            for (i, operand) in call.operands.iter().enumerate() {
                arg_handler.visit_child(visitor, i, operand);
            }
        }
    }

    fn monotonicity(&self, call: &SqlCall, scope: &dyn SqlScope) -> Monotonicity {
        call.operand(0).monotonicity(scope)
    }
}

/// An ordinary infix binary operator; exercises every default behavior
pub struct BinaryOperator {
    def: OperatorDef,
}

impl BinaryOperator {
    pub fn new(
        name: &'static str,
        kind: SqlKind,
        prec: u8,
        return_type: ReturnTypeStrategy,
    ) -> Self {
        BinaryOperator {
            def: OperatorDef {
                name,
                kind,
                prec,
                left_assoc: true,
                operands: OperandCountRange::exactly(2),
                return_type,
                operand_check: OperandCheckStrategy::Any,
            },
        }
    }

    /// The `=` comparison operator
    pub fn equals() -> Self {
        Self::new(
            "=",
            SqlKind::Equals,
            30,
            ReturnTypeStrategy::Fixed(DataType::Boolean),
        )
    }
}

impl SqlOperator for BinaryOperator {
    fn def(&self) -> &OperatorDef {
        &self.def
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::{Error, Result};
    use crate::sql::literal::SqlLiteral;
    use crate::sql::node::{Pos, SqlIdentifier, SqlNode};
    use crate::sql::types::Value;
    use crate::sql::validate::{BasicValidator, MapScope};
    use crate::sql::write::Dialect;

    fn ident(name: &str) -> SqlNode {
        SqlIdentifier::simple(name, Pos::ZERO).into()
    }

    fn as_call(operands: Vec<SqlNode>) -> SqlCall {
        SqlCall::new(Arc::new(AsOperator::new()), operands, Pos::ZERO)
    }

    fn scope() -> MapScope {
        MapScope::new()
            .with_field("x", DataType::Integer)
            .with_field("y", DataType::String)
    }

    #[test]
    fn test_as_validate_simple_alias() -> Result<()> {
        let call = as_call(vec![ident("x"), ident("alias")]);
        call.op
            .validate_call(&call, &BasicValidator, &scope(), &scope())
    }

    #[test]
    fn test_as_validate_rejects_qualified_alias() {
        let qualified: SqlNode =
            SqlIdentifier::qualified(vec!["a".into(), "b".into()], Pos::new(1, 9)).into();
        let call = as_call(vec![ident("x"), qualified]);
        let err = call
            .op
            .validate_call(&call, &BasicValidator, &scope(), &scope())
            .unwrap_err();
        assert_eq!(
            err,
            Error::validation(Pos::new(1, 9), "alias must be a simple identifier")
        );
    }

    #[test]
    fn test_as_validate_rejects_non_identifier_alias() {
        let expr: SqlNode = SqlLiteral::value(Value::Integer(1), Pos::new(2, 3)).into();
        let call = as_call(vec![ident("x"), expr]);
        let err = call
            .op
            .validate_call(&call, &BasicValidator, &scope(), &scope())
            .unwrap_err();
        assert!(matches!(err, Error::Validation { pos, .. } if pos == Pos::new(2, 3)));
    }

    #[test]
    fn test_as_unparse_round_trip() {
        let node: SqlNode = as_call(vec![ident("x"), ident("y")]).into();
        assert_eq!(node.to_sql_string(Dialect::Ansi), "x AS y");

        let with_columns: SqlNode =
            as_call(vec![ident("x"), ident("y"), ident("c1"), ident("c2")]).into();
        assert_eq!(with_columns.to_sql_string(Dialect::Ansi), "x AS y (c1, c2)");
    }

    #[test]
    fn test_as_nested_under_comparison_is_parenthesized() {
        // AS binds looser than =, so the alias call needs parentheses on
        // either side of the comparison to keep its meaning on re-parse
        let eq = Arc::new(BinaryOperator::equals());
        let aliased = as_call(vec![ident("x"), ident("y")]);

        let left: SqlNode =
            SqlCall::new(eq.clone(), vec![aliased.clone().into(), ident("z")], Pos::ZERO).into();
        assert_eq!(left.to_sql_string(Dialect::Ansi), "(x AS y) = z");

        let right: SqlNode =
            SqlCall::new(eq, vec![ident("z"), aliased.into()], Pos::ZERO).into();
        assert_eq!(right.to_sql_string(Dialect::Ansi), "z = (x AS y)");
    }

    #[test]
    fn test_comparison_under_as_needs_no_parens() {
        let eq = SqlCall::new(
            Arc::new(BinaryOperator::equals()),
            vec![ident("x"), ident("y")],
            Pos::ZERO,
        );
        let node: SqlNode = as_call(vec![eq.into(), ident("a")]).into();
        assert_eq!(node.to_sql_string(Dialect::Ansi), "x = y AS a");
    }

    #[test]
    fn test_as_derive_type_is_first_operand() -> Result<()> {
        let call = as_call(vec![ident("x"), ident("anything")]);
        let datatype = call.op.derive_type(&BasicValidator, &scope(), &call)?;
        assert_eq!(datatype, DataType::Integer);
        Ok(())
    }

    #[test]
    fn test_as_accept_call_expressions_only() {
        struct Collect(Vec<String>);
        impl SqlVisitor for Collect {
            fn visit(&mut self, node: &SqlNode) {
                self.0.push(node.to_string());
            }
        }

        let node: SqlNode = as_call(vec![ident("x"), ident("y")]).into();

        let mut exprs = Collect(Vec::new());
        node.accept(&mut exprs, true);
        assert_eq!(exprs.0, vec!["x AS y".to_string(), "x".to_string()]);

        let mut all = Collect(Vec::new());
        node.accept(&mut all, false);
        assert_eq!(all.0, vec!["x AS y".to_string(), "x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_as_monotonicity_forwards_first_operand() {
        let scope = MapScope::new()
            .with_field("ts", DataType::Integer)
            .with_monotonic("ts", Monotonicity::Increasing);
        let node: SqlNode = as_call(vec![ident("ts"), ident("t")]).into();
        assert_eq!(node.monotonicity(&scope), Monotonicity::Increasing);
    }

    #[test]
    fn test_operand_count_is_structural() {
        let call = as_call(vec![ident("x")]);
        let err = call.check_operand_count().unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }

    #[test]
    fn test_binary_defaults() -> Result<()> {
        let eq = Arc::new(BinaryOperator::equals());
        let call = SqlCall::new(eq.clone(), vec![ident("x"), ident("y")], Pos::ZERO);
        let node: SqlNode = call.clone().into();

        assert_eq!(node.to_sql_string(Dialect::Ansi), "x = y");
        assert_eq!(
            eq.derive_type(&BasicValidator, &scope(), &call)?,
            DataType::Boolean
        );
        assert_eq!(eq.monotonicity(&call, &scope()), Monotonicity::NotMonotonic);

        // Right-nested comparison needs parentheses; left-nested doesn't
        let inner = SqlCall::new(eq.clone(), vec![ident("x"), ident("y")], Pos::ZERO);
        let right_nested: SqlNode =
            SqlCall::new(eq.clone(), vec![ident("x"), inner.clone().into()], Pos::ZERO).into();
        assert_eq!(right_nested.to_sql_string(Dialect::Ansi), "x = (x = y)");
        let left_nested: SqlNode =
            SqlCall::new(eq, vec![inner.into(), ident("x")], Pos::ZERO).into();
        assert_eq!(left_nested.to_sql_string(Dialect::Ansi), "x = y = x");
        Ok(())
    }
}
