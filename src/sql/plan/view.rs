//! View expansion
//!
//! A view stores raw SQL text; it is never evaluated or cached, only
//! expanded into a relational subtree during planning, coerced to the row
//! type the reference site expects. Cycle safety comes from the planning
//! session's dependency graph: a view reachable from itself is refused
//! before any recursive expansion starts.

use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::graph::{DirectedEdge, DirectedGraph, EdgeFactory};
use crate::sql::plan::{Node, cast_to_row_type};
use crate::sql::types::{ProtoRowType, RowType, TypeFactory};

/// Parse/validate/convert collaborator supplied by the surrounding
/// query-preparation layer. May itself recursively reference other views.
pub trait ViewExpander {
    fn expand_view(
        &self,
        row_type: &RowType,
        view_sql: &str,
        schema_path: &[String],
    ) -> Result<Node>;
}

/// Parse entry point bound to a fixed materialization context, used by
/// [`ViewTableFunction`]
pub trait ViewParser {
    fn parse_view(&self, schema_path: Option<&[String]>, view_sql: &str) -> Result<ParsedView>;
}

/// Result of parsing a view definition against current schema state
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedView {
    pub row_type: RowType,
    /// Resolution path of the schema the view was parsed in; used when the
    /// view itself doesn't pin one
    pub schema_path: Vec<String>,
}

/// Table whose contents are defined by a SQL statement.
///
/// It is not evaluated; it is expanded during query planning, afresh from
/// text on every reference.
pub struct ViewTable {
    proto_row_type: Arc<dyn ProtoRowType>,
    view_sql: String,
    schema_path: Vec<String>,
}

impl ViewTable {
    pub fn new(
        proto_row_type: Arc<dyn ProtoRowType>,
        view_sql: impl Into<String>,
        schema_path: Vec<String>,
    ) -> Self {
        ViewTable {
            proto_row_type,
            view_sql: view_sql.into(),
            schema_path,
        }
    }

    pub fn view_sql(&self) -> &str {
        &self.view_sql
    }

    pub fn schema_path(&self) -> &[String] {
        &self.schema_path
    }

    /// Resolves the declared row type against a type factory
    pub fn row_type(&self, type_factory: &dyn TypeFactory) -> RowType {
        self.proto_row_type.apply(type_factory)
    }

    /// Expands the view at a reference site: parse/validate/convert the
    /// stored text, then coerce the subtree's output onto `row_type`. Any
    /// failure along the way is wrapped with the view's SQL text and
    /// re-signaled as a single expansion error; nothing is retried.
    pub fn to_plan(&self, context: &dyn ViewExpander, row_type: &RowType) -> Result<Node> {
        self.expand(context, row_type)
            .map_err(|e| Error::expansion(&self.view_sql, e.to_string()))
    }

    fn expand(&self, context: &dyn ViewExpander, row_type: &RowType) -> Result<Node> {
        let node = context.expand_view(row_type, &self.view_sql, &self.schema_path)?;
        cast_to_row_type(node, row_type, true)
    }
}

/// Refuses expansion of a view whose vertex can reach itself through the
/// recorded reference edges. Call before [`ViewTable::to_plan`].
pub fn ensure_acyclic<V, E, F>(
    graph: &DirectedGraph<V, E, F>,
    view: &V,
    view_sql: &str,
) -> Result<()>
where
    V: Eq + Hash + Clone + Display,
    E: DirectedEdge<V>,
    F: EdgeFactory<V, E>,
{
    if graph.is_reachable(view, view) {
        return Err(Error::expansion(
            view_sql,
            format!("cyclic view reference involving {}", view),
        ));
    }
    Ok(())
}

/// Zero-parameter table function that returns a view.
///
/// Each invocation re-parses the stored SQL against the materialization
/// context, so the returned view's row type reflects schema state at the
/// time of the call. Deliberately uncached: schema state may have changed
/// between calls.
pub struct ViewTableFunction {
    parser: Arc<dyn ViewParser>,
    view_sql: String,
    /// Typically None. If set, overrides the parsing schema's own path as
    /// the context for validating the view SQL.
    schema_path: Option<Vec<String>>,
}

impl ViewTableFunction {
    pub fn new(
        parser: Arc<dyn ViewParser>,
        view_sql: impl Into<String>,
        schema_path: Option<Vec<String>>,
    ) -> Self {
        ViewTableFunction {
            parser,
            view_sql: view_sql.into(),
            schema_path,
        }
    }

    /// Re-resolves the view from scratch and returns a fresh definition
    pub fn apply(&self) -> Result<ViewTable> {
        let parsed = self
            .parser
            .parse_view(self.schema_path.as_deref(), &self.view_sql)?;
        let schema_path = match &self.schema_path {
            Some(path) => path.clone(),
            None => parsed.schema_path,
        };
        Ok(ViewTable::new(
            Arc::new(parsed.row_type),
            self.view_sql.clone(),
            schema_path,
        ))
    }

    /// Row type of the view as of this call
    pub fn row_type(&self, type_factory: &dyn TypeFactory) -> Result<RowType> {
        Ok(self.apply()?.row_type(type_factory))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::graph::{DefaultEdge, DefaultEdgeFactory};
    use crate::sql::types::{BasicTypeFactory, DataType, Field};

    fn int_varchar_row() -> RowType {
        RowType::new(vec![
            Field::new("a", DataType::Integer),
            Field::new("b", DataType::String),
        ])
    }

    /// Expander producing a scan with a fixed natural row type
    struct FixedExpander {
        natural: RowType,
    }

    impl ViewExpander for FixedExpander {
        fn expand_view(
            &self,
            _row_type: &RowType,
            view_sql: &str,
            _schema_path: &[String],
        ) -> Result<Node> {
            assert!(!view_sql.is_empty());
            Ok(Node::Scan {
                table_name: "emps".to_string(),
                row_type: self.natural.clone(),
            })
        }
    }

    fn view() -> ViewTable {
        ViewTable::new(
            Arc::new(int_varchar_row()),
            "select a, b from emps",
            vec!["hr".to_string()],
        )
    }

    #[test]
    fn test_expansion_exact_type_needs_no_coercion() -> Result<()> {
        let expander = FixedExpander {
            natural: int_varchar_row(),
        };
        let plan = view().to_plan(&expander, &int_varchar_row())?;
        assert_eq!(plan.row_type(), &int_varchar_row());
        // No projection inserted on an exact match
        assert!(matches!(plan, Node::Scan { .. }));
        Ok(())
    }

    #[test]
    fn test_expansion_coerces_widened_field() -> Result<()> {
        let expander = FixedExpander {
            natural: int_varchar_row(),
        };
        let expected = RowType::new(vec![
            Field::new("a", DataType::Float),
            Field::new("b", DataType::String),
        ]);
        let plan = view().to_plan(&expander, &expected)?;
        assert_eq!(plan.row_type(), &expected);
        assert!(matches!(plan, Node::Projection { .. }));
        Ok(())
    }

    #[test]
    fn test_expansion_field_count_mismatch_names_view_sql() {
        let expander = FixedExpander {
            natural: int_varchar_row(),
        };
        let expected = RowType::new(vec![Field::new("a", DataType::Integer)]);
        let err = view().to_plan(&expander, &expected).unwrap_err();
        match err {
            Error::Expansion { sql, .. } => assert_eq!(sql, "select a, b from emps"),
            other => panic!("expected expansion error, got {:?}", other),
        }
    }

    #[test]
    fn test_expander_failure_is_wrapped_once() {
        struct Failing;
        impl ViewExpander for Failing {
            fn expand_view(&self, _: &RowType, _: &str, _: &[String]) -> Result<Node> {
                Err(Error::Parse("unexpected token FORM".to_string()))
            }
        }
        let err = view().to_plan(&Failing, &int_varchar_row()).unwrap_err();
        assert!(matches!(err, Error::Expansion { .. }));
        assert!(
            err.to_string()
                .starts_with("error while parsing view definition: select a, b from emps")
        );
    }

    #[test]
    fn test_cycle_rejected_before_expansion() -> Result<()> {
        let mut graph: DirectedGraph<String, DefaultEdge<String>, DefaultEdgeFactory> =
            DirectedGraph::new(DefaultEdgeFactory);
        for v in ["v1", "v2", "v3"] {
            graph.add_vertex(v.to_string());
        }
        graph.add_edge(&"v1".to_string(), &"v2".to_string())?;
        graph.add_edge(&"v2".to_string(), &"v3".to_string())?;
        ensure_acyclic(&graph, &"v1".to_string(), "select * from v2")?;

        graph.add_edge(&"v3".to_string(), &"v1".to_string())?;
        let err = ensure_acyclic(&graph, &"v1".to_string(), "select * from v2").unwrap_err();
        assert!(matches!(err, Error::Expansion { .. }));
        assert!(err.to_string().contains("v1"));
        Ok(())
    }

    /// Parser whose schema state can change between calls
    struct MutableSchemaParser {
        row_type: Mutex<RowType>,
    }

    impl ViewParser for MutableSchemaParser {
        fn parse_view(&self, schema_path: Option<&[String]>, _view_sql: &str) -> Result<ParsedView> {
            Ok(ParsedView {
                row_type: self.row_type.lock()?.clone(),
                schema_path: schema_path
                    .map(|p| p.to_vec())
                    .unwrap_or_else(|| vec!["default".to_string()]),
            })
        }
    }

    #[test]
    fn test_table_function_revalidates_every_call() -> Result<()> {
        let parser = Arc::new(MutableSchemaParser {
            row_type: Mutex::new(RowType::new(vec![Field::new("a", DataType::Integer)])),
        });
        let f = ViewTableFunction::new(parser.clone(), "select a from t", None);

        let first = f.apply()?;
        assert_eq!(
            first.row_type(&BasicTypeFactory),
            RowType::new(vec![Field::new("a", DataType::Integer)])
        );
        assert_eq!(first.schema_path(), &["default".to_string()]);

        // Schema changes under the function; the next call sees it
        *parser.row_type.lock()? = RowType::new(vec![
            Field::new("a", DataType::Integer),
            Field::new("added", DataType::String),
        ]);
        let second = f.row_type(&BasicTypeFactory)?;
        assert_eq!(second.field_count(), 2);
        Ok(())
    }

    #[test]
    fn test_table_function_pinned_schema_path_wins() -> Result<()> {
        let parser = Arc::new(MutableSchemaParser {
            row_type: Mutex::new(int_varchar_row()),
        });
        let f = ViewTableFunction::new(
            parser,
            "select a, b from t",
            Some(vec!["hr".to_string(), "emps".to_string()]),
        );
        let table = f.apply()?;
        assert_eq!(table.schema_path(), &["hr".to_string(), "emps".to_string()]);
        Ok(())
    }
}
