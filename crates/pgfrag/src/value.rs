//! Typed values that can appear inside a SQL fragment.
//!
//! [`SqlValue`] is a closed set: everything a fragment can hold is either bound
//! as a parameter (literals, structured records, arrays) or rendered inline
//! (identifiers, raw SQL, nested fragments, `DEFAULT`).

use crate::error::FragResult;
use crate::fragment::SqlFragment;
use crate::ident::Ident;
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A scalar that is sent to Postgres as a bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// JSON payload, bound to `json`/`jsonb` parameters.
    Json(Value),
}

impl ToSql for Literal {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Bool(v) => v.to_sql_checked(ty, out),
            Self::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Self::Float(v) => match *ty {
                Type::FLOAT4 => {
                    let narrowed = *v as f32;
                    if v.is_finite() && !narrowed.is_finite() {
                        return Err(format!("{v} is out of range for float4").into());
                    }
                    narrowed.to_sql_checked(ty, out)
                }
                _ => v.to_sql_checked(ty, out),
            },
            Self::Text(v) => v.to_sql_checked(ty, out),
            Self::Timestamp(v) => v.to_sql_checked(ty, out),
            Self::Json(v) => v.to_sql_checked(ty, out),
        }
    }

    // The variant decides; each arm delegates to the wrapped type's checked encoder.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

/// Anything that can be placed in a [`SqlFragment`].
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Bound as a parameter.
    Literal(Literal),
    /// Rendered inline, quoted as needed.
    Identifier(Ident),
    /// Rendered inline verbatim. Never put untrusted input here.
    Raw(String),
    /// A plain JSON record, bound as a `json` parameter.
    Structured(Map<String, Value>),
    /// A JSON array, bound as a parameter.
    Array(Vec<Value>),
    /// A nested fragment, inlined with continued parameter numbering.
    Fragment(SqlFragment),
    /// The SQL `DEFAULT` keyword.
    Default,
}

impl SqlValue {
    pub fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Serialize any `Serialize` value into its JSON-shaped `SqlValue`.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> FragResult<Self> {
        Ok(Self::from(serde_json::to_value(value)?))
    }

    /// True only for plain structured records: not arrays, null, scalars,
    /// timestamps, identifiers, raw SQL, fragments or `DEFAULT`.
    pub fn is_plain_record(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// Whether this value becomes a `$n` placeholder when compiled.
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Literal(_) | Self::Structured(_) | Self::Array(_))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

/// True iff `value` is a JSON object (a plain record).
pub fn is_pojo(value: &Value) -> bool {
    value.is_object()
}

impl From<Literal> for SqlValue {
    fn from(v: Literal) -> Self {
        Self::Literal(v)
    }
}

impl From<Ident> for SqlValue {
    fn from(v: Ident) -> Self {
        Self::Identifier(v)
    }
}

impl From<SqlFragment> for SqlValue {
    fn from(v: SqlFragment) -> Self {
        Self::Fragment(v)
    }
}

impl From<Value> for SqlValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Object(map) => Self::Structured(map),
            Value::Array(items) => Self::Array(items),
            Value::Null => Self::Literal(Literal::Null),
            Value::Bool(b) => Self::Literal(Literal::Bool(b)),
            Value::String(s) => Self::Literal(Literal::Text(s)),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Self::Literal(Literal::Int(i)),
                (None, Some(f)) if n.is_f64() => Self::Literal(Literal::Float(f)),
                // u64 beyond i64
                _ => Self::Literal(Literal::Json(Value::Number(n))),
            },
        }
    }
}

impl From<Map<String, Value>> for SqlValue {
    fn from(v: Map<String, Value>) -> Self {
        Self::Structured(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Literal(Literal::Timestamp(v))
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Literal(Literal::Bool(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Literal(Literal::Float(v))
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        Self::Literal(Literal::Float(f64::from(v)))
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Literal(Literal::Text(v.to_string()))
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Literal(Literal::Text(v))
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SqlValue {
                fn from(v: $t) -> Self {
                    Self::Literal(Literal::Int(i64::from(v)))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or_else(Self::null, Into::into)
    }
}
