//! Typed filters that compile down to SQL `WHERE` fragments with bound
//! parameters. Callers describe what they want; the store functions splice the
//! fragment into their `SELECT` and pass the values through
//! `params_from_iter`.

use rusqlite::types::Value;

/// A compiled filter: the SQL fragment (empty, or starting with ` WHERE`) and
/// the values for its `?` placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct WhereClause {
    pub sql: String,
    pub params: Vec<Value>,
}

impl WhereClause {
    fn from_conditions(conditions: Vec<String>, params: Vec<Value>) -> Self {
        if conditions.is_empty() {
            return Self::default();
        }
        Self {
            sql: format!(" WHERE {}", conditions.join(" AND ")),
            params,
        }
    }
}

/// Match on a person's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFilter {
    Any,
    /// Case-sensitive substring match.
    Contains(String),
}

impl NameFilter {
    pub fn contains(needle: impl Into<String>) -> Self {
        Self::Contains(needle.into())
    }

    pub(crate) fn where_clause(&self, column: &str) -> WhereClause {
        match self {
            Self::Any => WhereClause::default(),
            // `LIKE` folds ASCII case in SQLite; `instr` does not.
            Self::Contains(needle) => WhereClause::from_conditions(
                vec![format!("instr({column}, ?) > 0")],
                vec![Value::Text(needle.clone())],
            ),
        }
    }
}

/// Builder for book queries. Every setter narrows the result; an untouched
/// filter matches all books.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    title_contains: Option<String>,
    published_before: Option<i32>,
    published_from: Option<i32>,
    author_id: Option<i64>,
}

impl BookFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_contains(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = Some(needle.into());
        self
    }

    /// Publication year strictly less than `year`.
    pub fn published_before(mut self, year: i32) -> Self {
        self.published_before = Some(year);
        self
    }

    /// Publication year greater than or equal to `year`.
    pub fn published_from(mut self, year: i32) -> Self {
        self.published_from = Some(year);
        self
    }

    pub fn by_author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Compile against a books table aliased as `b`.
    pub(crate) fn where_clause(&self) -> WhereClause {
        const YEAR: &str = "CAST(strftime('%Y', b.pub_date) AS INTEGER)";

        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(needle) = &self.title_contains {
            conditions.push("instr(b.title, ?) > 0".to_string());
            params.push(Value::Text(needle.clone()));
        }
        if let Some(year) = self.published_before {
            conditions.push(format!("{YEAR} < ?"));
            params.push(Value::Integer(year.into()));
        }
        if let Some(year) = self.published_from {
            conditions.push(format!("{YEAR} >= ?"));
            params.push(Value::Integer(year.into()));
        }
        if let Some(author_id) = self.author_id {
            conditions.push("b.author_id = ?".to_string());
            params.push(Value::Integer(author_id));
        }

        WhereClause::from_conditions(conditions, params)
    }
}
