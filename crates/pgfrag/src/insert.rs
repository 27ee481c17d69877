//! Multi-row `INSERT ... VALUES` statements from rows of differing shapes.
//!
//! Rows are normalised with
//! [`complete_keys_with_default_value`](crate::util::complete_keys_with_default_value)
//! so the statement has one column list; a row that does not set a column
//! gets `DEFAULT` for it.
//!
//! # Example
//!
//! ```
//! use pgfrag::{insert_rows, Row, SqlValue};
//!
//! let a: Row<SqlValue> = [("x".to_string(), Some(SqlValue::from(1)))].into_iter().collect();
//! let b: Row<SqlValue> = [("y".to_string(), Some(SqlValue::from(2)))].into_iter().collect();
//!
//! let compiled = insert_rows("points", &[a, b]).unwrap().compile().unwrap();
//! assert_eq!(
//!     compiled.text,
//!     r#"INSERT INTO points ("x", "y") VALUES ($1, DEFAULT), (DEFAULT, $2)"#
//! );
//! ```

use crate::error::{FragError, FragResult};
use crate::fragment::{cols, vals, CompiledQuery, SqlFragment};
use crate::ident::{Ident, IntoIdent};
use crate::util::{complete_keys_with_default_value, Row, TrimmedRow};
use crate::value::SqlValue;

/// A normalised multi-row INSERT, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRows {
    table: Ident,
    rows: Vec<TrimmedRow<SqlValue>>,
    returning: Vec<Ident>,
}

/// Build a multi-row INSERT into `table`.
///
/// # Errors
///
/// - `rows` is empty
/// - more than one row and no row sets any column
/// - a column name is empty or contains NUL
/// - `table` is not a valid identifier
pub fn insert_rows(table: impl IntoIdent, rows: &[Row<SqlValue>]) -> FragResult<InsertRows> {
    let table = table.into_ident()?;
    if rows.is_empty() {
        return Err(FragError::validation(format!(
            "insert into {}: no rows",
            table.to_sql()
        )));
    }

    let rows = complete_keys_with_default_value(rows, SqlValue::Default);
    let column_count = rows.first().map_or(0, |row| row.len());
    if column_count == 0 && rows.len() > 1 {
        return Err(FragError::validation(format!(
            "insert into {}: {} rows without any column values",
            table.to_sql(),
            rows.len()
        )));
    }
    // fail on bad column names here rather than at render time
    if let Some(first) = rows.first() {
        cols(first)?;
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(
        target: "pgfrag.sql",
        table = %table.to_sql(),
        rows = rows.len(),
        columns = column_count,
        "normalised insert rows"
    );

    Ok(InsertRows {
        table,
        rows,
        returning: Vec::new(),
    })
}

impl InsertRows {
    /// Add a `RETURNING` clause with the given (quoted) columns.
    pub fn returning(mut self, columns: &[&str]) -> FragResult<Self> {
        for col in columns {
            self.returning.push(Ident::column(col)?);
        }
        Ok(self)
    }

    /// The shared column list, in first-seen order.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// The normalised rows; each has exactly [`columns`](Self::columns).
    pub fn rows(&self) -> &[TrimmedRow<SqlValue>] {
        &self.rows
    }

    /// Render as a fragment.
    pub fn to_fragment(&self) -> FragResult<SqlFragment> {
        let mut frag = sql_insert_into(&self.table);

        match self.rows.first() {
            Some(first) if !first.is_empty() => {
                frag.push(" (").push_sql(cols(first)?).push(") VALUES ");
                let tuples: Vec<SqlFragment> = self
                    .rows
                    .iter()
                    .map(|row| {
                        let mut tuple = SqlFragment::new("(");
                        tuple.push_sql(vals(row)).push(")");
                        tuple
                    })
                    .collect();
                frag.push_joined(tuples, ", ");
            }
            _ => {
                frag.push(" DEFAULT VALUES");
            }
        }

        if !self.returning.is_empty() {
            frag.push(" RETURNING ");
            let returning: Vec<SqlValue> =
                self.returning.iter().cloned().map(SqlValue::from).collect();
            frag.push_list(&returning, ", ");
        }
        Ok(frag)
    }

    /// Render and compile with the default configuration.
    pub fn compile(&self) -> FragResult<CompiledQuery> {
        Ok(self.to_fragment()?.compile())
    }
}

fn sql_insert_into(table: &Ident) -> SqlFragment {
    let mut frag = SqlFragment::new("INSERT INTO ");
    frag.push_value(table.clone());
    frag
}
