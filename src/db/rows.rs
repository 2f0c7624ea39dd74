//! Owned result sets returned by [`Database::query`](super::Database::query).

use std::fmt;
use std::sync::Arc;

use rusqlite::types::Value;

/// One result row: column name → value, in the statement's column order.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Value of the named column, if the statement produced it.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.get(column)? {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        match self.get(column)? {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        match self.get(column)? {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Ordered rows plus the column header they share.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Pipe-separated table, e.g. `id | amount` then a rule then one line per row.
impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return f.write_str("No results found");
        }
        let header = self.columns.join(" | ");
        writeln!(f, "{header}")?;
        writeln!(f, "{}", "-".repeat(header.chars().count()))?;
        for row in &self.rows {
            let line = row
                .values
                .iter()
                .map(display_value)
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(v) => v.clone(),
        Value::Blob(v) => format!("<{} bytes>", v.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryResult {
        let columns: Arc<[String]> = vec!["id".to_string(), "amount".to_string(), "note".to_string()].into();
        QueryResult {
            columns: columns.to_vec(),
            rows: vec![Row::new(
                columns,
                vec![Value::Integer(7), Value::Real(35.5), Value::Null],
            )],
        }
    }

    #[test]
    fn row_lookup_by_column_name() {
        let result = sample();
        let row = &result.rows[0];
        assert_eq!(row.get_i64("id"), Some(7));
        assert_eq!(row.get_f64("amount"), Some(35.5));
        assert_eq!(row.get("note"), Some(&Value::Null));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn renders_pipe_table() {
        let text = sample().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id | amount | note");
        assert_eq!(lines[1], "-".repeat("id | amount | note".len()));
        assert_eq!(lines[2], "7 | 35.5 | NULL");
    }

    #[test]
    fn empty_result_renders_message() {
        let empty = QueryResult {
            columns: vec!["id".into()],
            rows: vec![],
        };
        assert_eq!(empty.to_string(), "No results found");
    }
}
