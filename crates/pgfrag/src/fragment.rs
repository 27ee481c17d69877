//! Parameter-safe SQL fragment composition.
//!
//! A [`SqlFragment`] is a list of raw SQL text and typed [`SqlValue`]s. Nothing
//! is numbered until [`compile`](SqlFragment::compile): fragments can be built
//! independently, nested and reordered, and the final text still gets
//! `$1, $2, ...` in left-to-right order.
//!
//! # Example
//!
//! ```
//! use pgfrag::{sql, SqlValue};
//!
//! let mut cond = sql("");
//! cond.push_column("status").unwrap().push(" = ").push_value("active");
//!
//! let mut q = sql("SELECT * FROM users WHERE id = ");
//! q.push_value(42).push(" AND ").push_sql(cond);
//!
//! let compiled = q.compile();
//! assert_eq!(compiled.text, r#"SELECT * FROM users WHERE id = $1 AND "status" = $2"#);
//! assert_eq!(compiled.values.len(), 2);
//! ```

use crate::config::CompileConfig;
use crate::error::FragResult;
use crate::ident::{Ident, IntoIdent};
use crate::util::{map_with_separator, try_map_with_separator, Interleaved, TrimmedRow};
use crate::value::{Literal, SqlValue};
use serde_json::Value;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone, PartialEq)]
enum FragmentPart {
    Raw(String),
    Value(SqlValue),
}

/// Composable SQL text with typed, not-yet-numbered values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlFragment {
    parts: Vec<FragmentPart>,
}

/// Start building a SQL fragment.
pub fn sql(initial_sql: impl Into<String>) -> SqlFragment {
    SqlFragment::new(initial_sql)
}

/// The output of [`SqlFragment::compile`]: SQL text plus the values bound to
/// its placeholders (`values[k - 1]` is bound to `$k`).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub text: String,
    pub values: Vec<Literal>,
}

impl CompiledQuery {
    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }
}

impl SqlFragment {
    /// Create a fragment starting with raw SQL.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        let mut frag = Self::empty();
        frag.push(&initial_sql.into());
        frag
    }

    /// Create an empty fragment.
    pub fn empty() -> Self {
        Self { parts: Vec::new() }
    }

    /// Whether the fragment holds no SQL and no values.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of values that will become placeholders, nested fragments included.
    pub fn param_count(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match part {
                FragmentPart::Value(SqlValue::Fragment(inner)) => inner.param_count(),
                FragmentPart::Value(v) if v.is_bound() => 1,
                _ => 0,
            })
            .sum()
    }

    /// Append raw SQL.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(FragmentPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(FragmentPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a typed value.
    pub fn push_value(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        match value.into() {
            SqlValue::Raw(sql) => self.push(&sql),
            SqlValue::Fragment(inner) => self.push_sql(inner),
            other => {
                self.parts.push(FragmentPart::Value(other));
                self
            }
        }
    }

    /// Append a validated identifier (see [`Ident::parse`]).
    pub fn push_ident(&mut self, ident: impl IntoIdent) -> FragResult<&mut Self> {
        let ident = ident.into_ident()?;
        Ok(self.push_value(ident))
    }

    /// Append an always-quoted column name.
    pub fn push_column(&mut self, name: &str) -> FragResult<&mut Self> {
        let ident = Ident::column(name)?;
        Ok(self.push_value(ident))
    }

    /// Append the `DEFAULT` keyword.
    pub fn push_default(&mut self) -> &mut Self {
        self.push_value(SqlValue::Default)
    }

    /// Append another fragment, consuming it.
    pub fn push_sql(&mut self, other: SqlFragment) -> &mut Self {
        for part in other.parts {
            match part {
                FragmentPart::Raw(s) => {
                    self.push(&s);
                }
                value => self.parts.push(value),
            }
        }
        self
    }

    /// Append `items` as values separated by raw `separator`.
    ///
    /// An empty slice appends nothing.
    pub fn push_list<T>(&mut self, items: &[T], separator: &str) -> &mut Self
    where
        T: Clone + Into<SqlValue>,
    {
        let pieces = map_with_separator(items, separator, |item, _, _| -> SqlValue {
            item.clone().into()
        });
        for piece in pieces {
            match piece {
                Interleaved::Item(value) => self.push_value(value),
                Interleaved::Separator(sep) => self.push(sep),
            };
        }
        self
    }

    /// Append `fragments` separated by raw `separator` (e.g. `" AND "`).
    pub fn push_joined(&mut self, fragments: Vec<SqlFragment>, separator: &str) -> &mut Self {
        let values: Vec<SqlValue> = fragments.into_iter().map(SqlValue::Fragment).collect();
        self.push_list(&values, separator)
    }

    /// Compile with the default [`CompileConfig`].
    pub fn compile(&self) -> CompiledQuery {
        self.compile_with(&CompileConfig::default())
    }

    /// Render SQL text with `$n` placeholders and collect the bound values.
    pub fn compile_with(&self, config: &CompileConfig) -> CompiledQuery {
        let mut compiler = Compiler {
            config,
            text: String::new(),
            values: Vec::new(),
        };
        compiler.write_fragment(self);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "pgfrag.sql",
            sql = %truncate_sql_bytes(&compiler.text, 200),
            params = compiler.values.len(),
            "compiled sql fragment"
        );

        CompiledQuery {
            text: compiler.text,
            values: compiler.values,
        }
    }
}

struct Compiler<'c> {
    config: &'c CompileConfig,
    text: String,
    values: Vec<Literal>,
}

impl Compiler<'_> {
    fn write_fragment(&mut self, frag: &SqlFragment) {
        for part in &frag.parts {
            match part {
                FragmentPart::Raw(s) => self.text.push_str(s),
                FragmentPart::Value(v) => self.write_value(v),
            }
        }
    }

    fn write_value(&mut self, value: &SqlValue) {
        match value {
            SqlValue::Literal(lit) => self.bind(lit.clone(), false),
            SqlValue::Identifier(ident) => ident.write_sql(&mut self.text),
            SqlValue::Raw(s) => self.text.push_str(s),
            SqlValue::Structured(map) => self.bind(
                Literal::Json(Value::Object(map.clone())),
                self.config.cast_object_params_to_json,
            ),
            SqlValue::Array(items) => self.bind(
                Literal::Json(Value::Array(items.clone())),
                self.config.cast_array_params_to_json,
            ),
            SqlValue::Fragment(inner) => self.write_fragment(inner),
            SqlValue::Default => self.text.push_str("DEFAULT"),
        }
    }

    fn bind(&mut self, value: Literal, cast_to_json: bool) {
        self.values.push(value);
        self.text.push('$');
        self.text.push_str(&self.values.len().to_string());
        if cast_to_json {
            self.text.push_str("::json");
        }
    }
}

#[cfg(feature = "tracing")]
fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Quoted, comma-separated column list of `row`, in row order.
pub fn cols<V>(row: &TrimmedRow<V>) -> FragResult<SqlFragment> {
    let names: Vec<&String> = row.keys().collect();
    let pieces = try_map_with_separator(&names, ", ", |name, _, _| Ident::column(name))?;

    let mut frag = SqlFragment::empty();
    for piece in pieces {
        match piece {
            Interleaved::Item(ident) => frag.push_value(ident),
            Interleaved::Separator(sep) => frag.push(sep),
        };
    }
    Ok(frag)
}

/// Comma-separated values of `row`, in the same order as [`cols`].
pub fn vals(row: &TrimmedRow<SqlValue>) -> SqlFragment {
    let values: Vec<SqlValue> = row.values().cloned().collect();
    let mut frag = SqlFragment::empty();
    frag.push_list(&values, ", ");
    frag
}
