use std::cmp::Ordering;
use std::fmt::Display;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Supported SQL data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Integer,
    Float,
    String,
    Date,
}

impl DataType {
    /// Whether a value of this type may be cast to `target` during row-type
    /// coercion. Identical types need no cast; integers widen to floats; any
    /// type renders to a string. Everything else is rejected.
    pub fn can_cast_to(self, target: DataType) -> bool {
        self == target
            || matches!((self, target), (DataType::Integer, DataType::Float))
            || target == DataType::String
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
            DataType::String => "STRING",
            DataType::Date => "DATE",
        })
    }
}

/// Runtime value type for constant expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
}

impl Value {
    /// Returns the data type of the value, or None if it's Null
    pub fn datatype(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Boolean(_) => Some(DataType::Boolean),
            Self::Integer(_) => Some(DataType::Integer),
            Self::Float(_) => Some(DataType::Float),
            Self::String(_) => Some(DataType::String),
            Self::Date(_) => Some(DataType::Date),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) if *b => write!(f, "TRUE"),
            Value::Boolean(_) => write!(f, "FALSE"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
        }
    }
}

/// Implements partial ordering for Value comparison (used by monotonicity
/// reasoning downstream)
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Null, _) => Some(Ordering::Less),
            (_, Value::Null) => Some(Ordering::Greater),
            (Value::Boolean(a), Value::Boolean(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (_, _) => None,
        }
    }
}

/// A named, typed field of a row type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub datatype: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Field {
            name: name.into(),
            datatype,
            nullable: true,
        }
    }
}

/// The ordered field-name/type schema describing the output of a relational
/// expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowType {
    fields: Vec<Field>,
}

impl RowType {
    pub fn new(fields: Vec<Field>) -> Self {
        RowType { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, index: usize) -> &Field {
        &self.fields[index]
    }

    /// Returns the index of the field with the given name, if any
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl Display for RowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", field.name, field.datatype)?;
        }
        write!(f, ")")
    }
}

/// Resolves type-name tags and row-type descriptors into concrete types
pub trait TypeFactory {
    /// Maps a type-name tag to a canonical type
    fn create_type(&self, datatype: DataType) -> DataType {
        datatype
    }

    fn create_row_type(&self, fields: Vec<Field>) -> RowType {
        RowType::new(fields)
    }
}

/// Type factory with no canonicalization beyond identity
pub struct BasicTypeFactory;

impl TypeFactory for BasicTypeFactory {}

/// A row-type descriptor resolved lazily against a type factory
///
/// View definitions hold one of these rather than a resolved row type, so
/// resolution can reflect the type factory in use at expansion time.
pub trait ProtoRowType: Send + Sync {
    fn apply(&self, type_factory: &dyn TypeFactory) -> RowType;
}

impl ProtoRowType for RowType {
    fn apply(&self, type_factory: &dyn TypeFactory) -> RowType {
        type_factory.create_row_type(self.fields.clone())
    }
}
