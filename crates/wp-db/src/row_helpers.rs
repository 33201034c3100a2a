//! Shared helpers for reading DuckDB rows.

use crate::error::DbResult;
use crate::traits::Value;

/// Read a column as a [`Value`], trying text first and then integer.
///
/// DuckDB refuses `Option<String>` for integer columns, so we try
/// String -> i64 -> f64 -> bool -> null. Floats and booleans come back as
/// text.
pub(crate) fn get_column_value(row: &duckdb::Row<'_>, idx: usize) -> Value {
    if let Ok(Some(s)) = row.get::<_, Option<String>>(idx) {
        return Value::Text(s);
    }
    if let Ok(Some(n)) = row.get::<_, Option<i64>>(idx) {
        return Value::Integer(n);
    }
    if let Ok(Some(f)) = row.get::<_, Option<f64>>(idx) {
        return Value::Text(f.to_string());
    }
    if let Ok(Some(b)) = row.get::<_, Option<bool>>(idx) {
        return Value::Text(b.to_string());
    }
    Value::Null
}

/// Execute a prepared statement and collect all rows.
///
/// DuckDB 1.4 panics on `stmt.column_count()` before execution, so the
/// column count is read from each row instead.
pub(crate) fn collect_rows(
    stmt: &mut duckdb::Statement<'_>,
    params: &[Value],
) -> DbResult<Vec<Vec<Value>>> {
    let rows = stmt
        .query_map(duckdb::params_from_iter(params.iter()), |row| {
            let col_count = row.as_ref().column_count();
            Ok((0..col_count).map(|i| get_column_value(row, i)).collect())
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
