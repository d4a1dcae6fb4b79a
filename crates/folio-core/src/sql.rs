//! Parameterized SQL statements and result rows
//!
//! Some lookups, such as site ownership, are joins over repository tables
//! rather than asset reads. They go through [`SqlExecutor`](crate::SqlExecutor)
//! with a prepared [`Statement`] and positional [`SqlParam`]s.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::RepositoryAccessError;

/// A prepared, parameterized select statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    /// Stable name, used by backends to key cached plans
    pub name: String,
    /// Statement text with `?` placeholders
    pub sql: String,
    /// Tables the statement reads (used by backends for cache invalidation)
    pub tables: Vec<String>,
}

impl Statement {
    /// Create a new statement
    pub fn new(
        name: impl Into<String>,
        sql: impl Into<String>,
        tables: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
            tables: tables.into_iter().map(str::to_string).collect(),
        }
    }

    /// Number of `?` placeholders in the statement text
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}

/// A positional statement parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlParam {
    Text(String),
    Long(i64),
}

impl Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::Text(s) => write!(f, "'{}'", s),
            SqlParam::Long(n) => write!(f, "{}", n),
        }
    }
}

/// One result row, columns keyed by lower-cased name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    columns: BTreeMap<String, String>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column (builder style)
    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.columns.insert(column.to_ascii_lowercase(), value.into());
        self
    }

    /// Column value as text; column names are case-insensitive
    pub fn get_string(&self, column: &str) -> Option<&str> {
        self.columns
            .get(&column.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Rows produced by a select, in the order the backend returns them
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<Row, RepositoryAccessError>> + 'a>;
