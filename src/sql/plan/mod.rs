//! Relational plan nodes and row-type coercion
//!
//! The planner front-end produces these nodes for a downstream optimizer;
//! nothing here executes.

use crate::error::{Error, Result};
use crate::sql::types::{DataType, Field, RowType, Value};

pub mod view;

/// Logical relational plan node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Table scan
    Scan { table_name: String, row_type: RowType },
    /// Inline constant rows
    Values {
        rows: Vec<Vec<Value>>,
        row_type: RowType,
    },
    /// Field-by-field projection, optionally casting and renaming
    Projection {
        source: Box<Node>,
        exprs: Vec<FieldExpr>,
        row_type: RowType,
    },
}

/// One output field of a projection: a source field index, an optional cast,
/// and the output name
#[derive(Debug, Clone, PartialEq)]
pub struct FieldExpr {
    pub input: usize,
    pub cast: Option<DataType>,
    pub name: String,
}

impl Node {
    /// The ordered field-name/type schema of this node's output
    pub fn row_type(&self) -> &RowType {
        match self {
            Node::Scan { row_type, .. } => row_type,
            Node::Values { row_type, .. } => row_type,
            Node::Projection { row_type, .. } => row_type,
        }
    }
}

/// Coerces a node's output onto `expected`, field by field.
///
/// A node whose row type already equals the expected type passes through
/// unchanged. Otherwise each expected field is matched to a source field by
/// name where a name matches, positionally otherwise; type mismatches get a
/// cast where the type system permits one, and the output carries the
/// expected field names when `rename` is set. Field-count mismatch or an
/// impermissible cast fails.
pub fn cast_to_row_type(node: Node, expected: &RowType, rename: bool) -> Result<Node> {
    let source = node.row_type();
    if source == expected {
        return Ok(node);
    }
    if source.field_count() != expected.field_count() {
        return Err(Error::Internal(format!(
            "field counts differ: {} has {} fields, expected {} with {}",
            source,
            source.field_count(),
            expected,
            expected.field_count()
        )));
    }

    let mut exprs = Vec::with_capacity(expected.field_count());
    let mut fields = Vec::with_capacity(expected.field_count());
    for (i, want) in expected.fields().iter().enumerate() {
        let input = source.field_index(&want.name).unwrap_or(i);
        let have = source.field(input);
        let cast = if have.datatype == want.datatype {
            None
        } else if have.datatype.can_cast_to(want.datatype) {
            Some(want.datatype)
        } else {
            return Err(Error::Internal(format!(
                "cannot cast field {} from {} to {}",
                have.name, have.datatype, want.datatype
            )));
        };
        let name = if rename {
            want.name.clone()
        } else {
            have.name.clone()
        };
        fields.push(Field {
            name: name.clone(),
            datatype: want.datatype,
            nullable: want.nullable,
        });
        exprs.push(FieldExpr { input, cast, name });
    }

    Ok(Node::Projection {
        source: Box::new(node),
        exprs,
        row_type: RowType::new(fields),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(fields: Vec<Field>) -> Node {
        Node::Scan {
            table_name: "t".to_string(),
            row_type: RowType::new(fields),
        }
    }

    #[test]
    fn test_identical_row_type_passes_through() -> Result<()> {
        let row = RowType::new(vec![
            Field::new("a", DataType::Integer),
            Field::new("b", DataType::String),
        ]);
        let node = scan(row.fields().to_vec());
        let out = cast_to_row_type(node.clone(), &row, true)?;
        assert_eq!(out, node);
        Ok(())
    }

    #[test]
    fn test_cast_and_rename_by_name() -> Result<()> {
        // Source has (b, a); expected wants (a, b) with a widened to FLOAT
        let node = scan(vec![
            Field::new("b", DataType::String),
            Field::new("a", DataType::Integer),
        ]);
        let expected = RowType::new(vec![
            Field::new("a", DataType::Float),
            Field::new("b", DataType::String),
        ]);
        let out = cast_to_row_type(node, &expected, true)?;
        assert_eq!(out.row_type(), &expected);
        match out {
            Node::Projection { exprs, .. } => {
                assert_eq!(exprs[0], FieldExpr {
                    input: 1,
                    cast: Some(DataType::Float),
                    name: "a".to_string(),
                });
                assert_eq!(exprs[1], FieldExpr {
                    input: 0,
                    cast: None,
                    name: "b".to_string(),
                });
            }
            other => panic!("expected projection, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_positional_match_when_names_differ() -> Result<()> {
        let node = scan(vec![Field::new("x", DataType::Integer)]);
        let expected = RowType::new(vec![Field::new("a", DataType::Integer)]);
        let out = cast_to_row_type(node, &expected, true)?;
        assert_eq!(out.row_type(), &expected);
        Ok(())
    }

    #[test]
    fn test_field_count_mismatch_fails() {
        let node = scan(vec![Field::new("a", DataType::Integer)]);
        let expected = RowType::new(vec![
            Field::new("a", DataType::Integer),
            Field::new("b", DataType::String),
        ]);
        assert!(matches!(
            cast_to_row_type(node, &expected, true),
            Err(Error::Internal(_))
        ));
    }

    #[test]
    fn test_unwidenable_type_fails() {
        let node = scan(vec![Field::new("a", DataType::String)]);
        let expected = RowType::new(vec![Field::new("a", DataType::Integer)]);
        assert!(matches!(
            cast_to_row_type(node, &expected, true),
            Err(Error::Internal(_))
        ));
    }
}
