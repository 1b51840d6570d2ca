use std::fmt::{self, Display};

use chrono::NaiveDate;

use crate::sql::node::Pos;
use crate::sql::types::{DataType, TypeFactory, Value};
use crate::sql::write::{Dialect, SqlWriter};

/// Default rendering format for date literals, e.g. `1969-07-21`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An immutable typed constant value node
#[derive(Debug, Clone, PartialEq)]
pub enum SqlLiteral {
    Value(SqlValueLiteral),
    Date(SqlDateLiteral),
}

impl SqlLiteral {
    /// Creates a literal from a runtime value; the type tag is taken from
    /// the value itself (`None` for NULL)
    pub fn value(value: Value, pos: Pos) -> Self {
        let type_name = value.datatype();
        SqlLiteral::Value(SqlValueLiteral {
            value,
            type_name,
            pos,
        })
    }

    /// Creates a date literal with the default format
    pub fn date(date: NaiveDate, pos: Pos) -> Self {
        SqlLiteral::Date(SqlDateLiteral::new(date, pos))
    }

    pub fn pos(&self) -> Pos {
        match self {
            SqlLiteral::Value(lit) => lit.pos,
            SqlLiteral::Date(lit) => lit.pos,
        }
    }

    /// The literal's type-name tag (`None` only for NULL)
    pub fn type_name(&self) -> Option<DataType> {
        match self {
            SqlLiteral::Value(lit) => lit.type_name,
            SqlLiteral::Date(_) => Some(DataType::Date),
        }
    }

    /// Maps the literal's type tag to a canonical type
    pub fn create_type(&self, type_factory: &dyn TypeFactory) -> Option<DataType> {
        self.type_name().map(|t| type_factory.create_type(t))
    }

    /// Produces a value-identical literal at a different source position
    pub fn clone_at(&self, pos: Pos) -> SqlLiteral {
        match self {
            SqlLiteral::Value(lit) => SqlLiteral::Value(SqlValueLiteral {
                value: lit.value.clone(),
                type_name: lit.type_name,
                pos,
            }),
            SqlLiteral::Date(lit) => SqlLiteral::Date(SqlDateLiteral {
                date: lit.date,
                format: lit.format.clone(),
                pos,
            }),
        }
    }

    pub fn unparse(&self, writer: &mut dyn SqlWriter, _left_prec: u8, _right_prec: u8) {
        match self {
            SqlLiteral::Value(lit) => writer.literal(&lit.to_string()),
            SqlLiteral::Date(lit) => lit.unparse(writer),
        }
    }
}

/// A plain constant literal (boolean, numeric, string, NULL)
#[derive(Debug, Clone, PartialEq)]
pub struct SqlValueLiteral {
    pub value: Value,
    pub type_name: Option<DataType>,
    pub pos: Pos,
}

impl Display for SqlValueLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            // Single quotes escape by doubling
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            other => write!(f, "{}", other),
        }
    }
}

/// A SQL literal representing a DATE value, such as `DATE '2004-10-22'`
#[derive(Debug, Clone, PartialEq)]
pub struct SqlDateLiteral {
    date: NaiveDate,
    format: String,
    pub pos: Pos,
}

impl SqlDateLiteral {
    pub fn new(date: NaiveDate, pos: Pos) -> Self {
        SqlDateLiteral {
            date,
            format: DATE_FORMAT.to_string(),
            pos,
        }
    }

    pub fn with_format(date: NaiveDate, format: impl Into<String>, pos: Pos) -> Self {
        SqlDateLiteral {
            date,
            format: format.into(),
            pos,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns e.g. '1969-07-21'
    pub fn to_formatted_string(&self) -> String {
        self.date.format(&self.format).to_string()
    }

    /// Dialects without a date-literal keyword get the bare quoted string;
    /// everything else gets the canonical keyword form
    pub fn unparse(&self, writer: &mut dyn SqlWriter) {
        match writer.dialect() {
            Dialect::Mssql => writer.literal(&format!("'{}'", self.to_formatted_string())),
            _ => writer.literal(&self.to_string()),
        }
    }
}

impl Display for SqlDateLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DATE '{}'", self.to_formatted_string())
    }
}
