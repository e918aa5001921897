//! SQL statements for `executeSQLQuery` / `executeSQLUpdate`
//!
//! AXL takes a single SQL string. [`SqlStatement::new`] renders `?`
//! placeholders outside `'…'` and `"…"` literals with quoted values;
//! [`SqlStatement::unchecked`] sends the caller's text as-is and is the only
//! way to do so.

use crate::error::{AxlError, Result};
use crate::xml::escape_text;

/// A value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Null,
}

impl SqlValue {
    /// Informix literal: text single-quoted with embedded quotes doubled
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Text(text) => format!("'{}'", text.replace('\'', "''")),
            SqlValue::Int(n) => n.to_string(),
            SqlValue::Null => "NULL".to_string(),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Template { text: String, params: Vec<SqlValue> },
    Unchecked(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStatement {
    source: Source,
}

impl SqlStatement {
    /// Statement with `?` placeholders, filled in by [`bind`](Self::bind)
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            source: Source::Template {
                text: template.into(),
                params: Vec::new(),
            },
        }
    }

    /// Caller-built SQL sent verbatim. Nothing in it is quoted or checked.
    pub fn unchecked(sql: impl Into<String>) -> Self {
        Self {
            source: Source::Unchecked(sql.into()),
        }
    }

    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        if let Source::Template { params, .. } = &mut self.source {
            params.push(value.into());
        }
        self
    }

    pub fn is_unchecked(&self) -> bool {
        matches!(self.source, Source::Unchecked(_))
    }

    /// Final SQL text. Fails when placeholders and bindings disagree.
    pub fn render(&self) -> Result<String> {
        let (template, params) = match &self.source {
            Source::Unchecked(sql) => return Ok(sql.clone()),
            Source::Template { text, params } => (text, params),
        };

        let mut rendered = String::with_capacity(template.len());
        let mut values = params.iter();
        // Informix reads both '…' and "…" as string literals.
        let mut open_quote: Option<char> = None;
        let mut placeholders = 0usize;

        for ch in template.chars() {
            match ch {
                '\'' | '"' => {
                    match open_quote {
                        None => open_quote = Some(ch),
                        Some(quote) if quote == ch => open_quote = None,
                        Some(_) => {}
                    }
                    rendered.push(ch);
                }
                '?' if open_quote.is_none() => {
                    placeholders += 1;
                    match values.next() {
                        Some(value) => rendered.push_str(&value.to_literal()),
                        None => {
                            return Err(AxlError::InvalidArguments(format!(
                                "SQL has more placeholders than the {} bound value(s)",
                                params.len()
                            )))
                        }
                    }
                }
                _ => rendered.push(ch),
            }
        }

        if placeholders != params.len() {
            return Err(AxlError::InvalidArguments(format!(
                "SQL has {} placeholder(s) but {} bound value(s)",
                placeholders,
                params.len()
            )));
        }

        Ok(rendered)
    }
}

/// `<sql>…</sql>` body for the execute operations
pub fn sql_body(statement: &SqlStatement) -> Result<String> {
    let sql = statement.render()?;
    if statement.is_unchecked() {
        tracing::debug!("Sending unchecked SQL statement");
    }
    Ok(format!("<sql>{}</sql>", escape_text(&sql)))
}
