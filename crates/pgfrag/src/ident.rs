//! SQL identifiers.
//!
//! Postgres cannot bind identifiers as parameters, so they are rendered inline
//! and must be validated or quoted first.
//!
//! - Unquoted segments must match `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted segments may hold anything but NUL; `"` is doubled on output
//!
//! Row keys are arbitrary strings, so column names coming from rows go through
//! [`Ident::column`], which always quotes.

use crate::error::{FragError, FragResult};
use std::iter::Peekable;
use std::str::Chars;

/// One dot-separated segment of an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    Unquoted(String),
    Quoted(String),
}

/// A schema, table or column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// A single quoted segment, e.g. a column name taken from a row key.
    pub fn column(name: &str) -> FragResult<Self> {
        if name.is_empty() {
            return Err(FragError::validation("Empty column name"));
        }
        if name.contains('\0') {
            return Err(FragError::validation(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self {
            parts: vec![IdentPart::Quoted(name.to_string())],
        })
    }

    /// Parse `table`, `schema.table`, `"Mixed"."Case"` or any mix of those.
    pub fn parse(s: &str) -> FragResult<Self> {
        if s.is_empty() {
            return Err(FragError::validation("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(FragError::validation(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut chars = s.chars().peekable();
        let mut parts = vec![parse_part(&mut chars)?];
        while let Some(c) = chars.next() {
            if c != '.' {
                return Err(FragError::validation(format!(
                    "Expected '.' between identifier parts in '{s}', got '{c}'"
                )));
            }
            parts.push(parse_part(&mut chars)?);
        }

        Ok(Self { parts })
    }

    /// Render as SQL text.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) => out.push_str(s),
                IdentPart::Quoted(s) => {
                    out.push('"');
                    out.push_str(&s.replace('"', "\"\""));
                    out.push('"');
                }
            }
        }
    }
}

fn parse_part(chars: &mut Peekable<Chars<'_>>) -> FragResult<IdentPart> {
    if chars.peek() == Some(&'"') {
        chars.next();
        return parse_quoted(chars);
    }

    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c == '.' {
            break;
        }
        let ok = if name.is_empty() {
            c == '_' || c.is_ascii_alphabetic()
        } else {
            c == '_' || c == '$' || c.is_ascii_alphanumeric()
        };
        if !ok {
            return Err(FragError::validation(format!(
                "Invalid character in identifier: '{c}'"
            )));
        }
        name.push(c);
        chars.next();
    }

    if name.is_empty() {
        return Err(FragError::validation("Empty identifier segment"));
    }
    Ok(IdentPart::Unquoted(name))
}

fn parse_quoted(chars: &mut Peekable<Chars<'_>>) -> FragResult<IdentPart> {
    let mut name = String::new();
    loop {
        match chars.next() {
            Some('"') if chars.peek() == Some(&'"') => {
                chars.next();
                name.push('"');
            }
            Some('"') => break,
            Some(c) => name.push(c),
            None => return Err(FragError::validation("Unclosed quoted identifier")),
        }
    }
    if name.is_empty() {
        return Err(FragError::validation("Empty quoted identifier"));
    }
    Ok(IdentPart::Quoted(name))
}

/// Conversion into an [`Ident`] for builder arguments.
pub trait IntoIdent {
    fn into_ident(self) -> FragResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> FragResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> FragResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> FragResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> FragResult<Ident> {
        Ident::parse(&self)
    }
}
