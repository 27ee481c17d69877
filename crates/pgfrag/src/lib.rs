//! # pgfrag
//!
//! Typed, parameter-safe SQL fragment composition for PostgreSQL.
//!
//! ## Features
//!
//! - **Typed pieces**: values, identifiers, raw SQL and `DEFAULT` are distinct
//!   [`SqlValue`] variants, never mixed up as strings
//! - **Late numbering**: `$1, $2, ...` are assigned at compile time, so
//!   fragments compose in any order and nesting
//! - **Uniform rows**: [`complete_keys_with_default_value`] gives every row of a
//!   batch the same columns, which [`insert_rows`] turns into one multi-row
//!   `INSERT`
//! - **tokio-postgres ready**: [`CompiledQuery::params_ref`] plugs straight into
//!   `Client::query`
//!
//! ## Example
//!
//! ```
//! use pgfrag::sql;
//!
//! let ids = [3_i64, 5, 8];
//! let mut q = sql("SELECT * FROM ");
//! q.push_ident("public.users").unwrap();
//! q.push(" WHERE id IN (").push_list(&ids, ", ").push(")");
//!
//! let compiled = q.compile();
//! assert_eq!(compiled.text, "SELECT * FROM public.users WHERE id IN ($1, $2, $3)");
//! assert_eq!(compiled.params_ref().len(), 3);
//! ```
//!
//! SQL debug logs are emitted through `tracing` on the `pgfrag.sql` target
//! (crate feature `tracing`, on by default).

pub mod config;
pub mod error;
pub mod fragment;
pub mod ident;
pub mod insert;
pub mod util;
pub mod value;

pub use config::CompileConfig;
pub use error::{FragError, FragResult};
pub use fragment::{cols, sql, vals, CompiledQuery, SqlFragment};
pub use ident::{Ident, IdentPart, IntoIdent};
pub use insert::{insert_rows, InsertRows};
pub use util::{
    complete_keys_with_default_value, map_with_separator, pad, trim_obj, try_map_with_separator,
    union_keys, wait, Interleaved, PadWidth, Row, TrimmedRow,
};
pub use value::{is_pojo, Literal, SqlValue};
