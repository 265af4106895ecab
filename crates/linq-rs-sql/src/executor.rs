//! The execution seam: compiled SQL goes out, rows come back.
//!
//! The compiler itself performs no I/O. [`SqlExecutor`] is the minimal async
//! interface an execution collaborator implements: it sends the statement
//! text with the parameters bound by placeholder name, manages any scoped
//! connection resources, and hands back [`Row`] values. Materializing rows
//! into mapped types goes through [`FromRow`].

use linq_rs_core::error::{LinqError, LinqResult};

use crate::compiler::CompiledSql;
use crate::value::Value;

/// A generic result row: column names paired with values.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a row from column names and values.
    ///
    /// Fails with [`LinqError::DatabaseError`] when the counts differ.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> LinqResult<Self> {
        if columns.len() != values.len() {
            return Err(LinqError::DatabaseError(format!(
                "row has {} columns but {} values",
                columns.len(),
                values.len()
            )));
        }
        Ok(Self { columns, values })
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets a typed value by column name.
    pub fn get<T: FromValue>(&self, column: &str) -> LinqResult<T> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| LinqError::DatabaseError(format!("column '{column}' not in row")))?;
        T::from_value(&self.values[idx])
    }

    /// Gets a typed value by column index.
    pub fn get_by_index<T: FromValue>(&self, idx: usize) -> LinqResult<T> {
        let value = self.values.get(idx).ok_or_else(|| {
            LinqError::DatabaseError(format!(
                "column index {idx} out of bounds (row has {} columns)",
                self.values.len()
            ))
        })?;
        T::from_value(value)
    }

    /// Returns the raw value at a column name, if present.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }
}

/// Converts a [`Value`] into a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts the conversion.
    fn from_value(value: &Value) -> LinqResult<Self>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> LinqResult<Self> {
        match value {
            Value::Int(i) => Ok(*i),
            _ => Err(LinqError::DatabaseError(format!("expected Int, got {value:?}"))),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> LinqResult<Self> {
        match value {
            Value::Int(i) => Self::try_from(*i)
                .map_err(|e| LinqError::DatabaseError(format!("Int out of i32 range: {e}"))),
            _ => Err(LinqError::DatabaseError(format!("expected Int, got {value:?}"))),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> LinqResult<Self> {
        match value {
            Value::Float(f) => Ok(*f),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(i) => Ok(*i as Self),
            _ => Err(LinqError::DatabaseError(format!("expected Float, got {value:?}"))),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> LinqResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(LinqError::DatabaseError(format!("expected Bool, got {value:?}"))),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> LinqResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(LinqError::DatabaseError(format!("expected String, got {value:?}"))),
        }
    }
}

impl FromValue for uuid::Uuid {
    fn from_value(value: &Value) -> LinqResult<Self> {
        match value {
            Value::Uuid(u) => Ok(*u),
            _ => Err(LinqError::DatabaseError(format!("expected Uuid, got {value:?}"))),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> LinqResult<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> LinqResult<Self> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

/// Materializes one result row into a concrete type.
pub trait FromRow: Sized {
    /// Builds an instance from a row.
    fn from_row(row: &Row) -> LinqResult<Self>;
}

/// Minimal async executor interface implemented by database backends.
///
/// Implementations bind `compiled.parameters` by placeholder name before
/// sending `compiled.text`. The compiler may be called concurrently with an
/// in-flight statement on the same logical connection; it touches no
/// connection state.
#[async_trait::async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Runs a statement that does not return rows; yields the affected count.
    async fn execute(&self, compiled: &CompiledSql) -> LinqResult<u64>;

    /// Runs a query and returns all result rows.
    async fn query(&self, compiled: &CompiledSql) -> LinqResult<Vec<Row>>;

    /// Runs a query expected to return exactly one row.
    async fn query_one(&self, compiled: &CompiledSql) -> LinqResult<Row> {
        let mut rows = self.query(compiled).await?.into_iter();
        match (rows.next(), rows.next()) {
            (Some(row), None) => Ok(row),
            (None, _) => Err(LinqError::DatabaseError("query returned no rows".to_string())),
            _ => Err(LinqError::DatabaseError(
                "query returned more than one row".to_string(),
            )),
        }
    }
}

/// Runs a query and materializes every row through [`FromRow`].
pub async fn fetch_all<T: FromRow>(
    executor: &dyn SqlExecutor,
    compiled: &CompiledSql,
) -> LinqResult<Vec<T>> {
    let rows = executor.query(compiled).await?;
    rows.iter().map(T::from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    fn row() -> Row {
        Row::new(
            vec!["id".to_string(), "name".to_string(), "score".to_string()],
            vec![
                Value::Int(7),
                Value::String("Alice".to_string()),
                Value::Null,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_get_by_name() {
        let row = row();
        assert_eq!(row.get::<i64>("id").unwrap(), 7);
        assert_eq!(row.get::<String>("name").unwrap(), "Alice");
    }

    #[test]
    fn test_get_missing_column() {
        assert!(row().get::<i64>("absent").is_err());
    }

    #[test]
    fn test_null_maps_to_none() {
        assert_eq!(row().get::<Option<f64>>("score").unwrap(), None);
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        assert!(row().get::<bool>("name").is_err());
    }

    #[test]
    fn test_mismatched_counts_rejected() {
        assert!(Row::new(vec!["a".to_string()], vec![]).is_err());
    }

    #[test]
    fn test_get_by_index() {
        let row = row();
        assert_eq!(row.get_by_index::<i64>(0).unwrap(), 7);
        assert!(row.get_by_index::<i64>(9).is_err());
    }

    struct Pair {
        id: i64,
        name: String,
    }

    impl FromRow for Pair {
        fn from_row(row: &Row) -> LinqResult<Self> {
            Ok(Self {
                id: row.get("id")?,
                name: row.get("name")?,
            })
        }
    }

    struct StaticRows(Vec<Row>);

    #[async_trait::async_trait]
    impl SqlExecutor for StaticRows {
        async fn execute(&self, _compiled: &CompiledSql) -> LinqResult<u64> {
            Ok(0)
        }

        async fn query(&self, _compiled: &CompiledSql) -> LinqResult<Vec<Row>> {
            Ok(self.0.clone())
        }
    }

    fn compiled() -> CompiledSql {
        CompiledSql {
            text: "SELECT 1".to_string(),
            parameters: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_fetch_all_materializes_rows() {
        let executor = StaticRows(vec![row()]);
        let pairs: Vec<Pair> = fetch_all(&executor, &compiled()).await.unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].id, 7);
        assert_eq!(pairs[0].name, "Alice");
    }

    #[tokio::test]
    async fn test_query_one_requires_exactly_one_row() {
        let none = StaticRows(vec![]);
        assert!(none.query_one(&compiled()).await.is_err());

        let two = StaticRows(vec![row(), row()]);
        assert!(two.query_one(&compiled()).await.is_err());

        let one = StaticRows(vec![row()]);
        assert_ok!(one.query_one(&compiled()).await);
    }
}
