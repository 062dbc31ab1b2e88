//! Fluent JQL query builder.
//!
//! ```no_run
//! # async fn demo(client: &jirakit::Client) -> jirakit::api::Result<()> {
//! let issues = client
//!     .search()
//!     .where_eq("project", "MY PROJECT")
//!     .where_in("status", ["Open", "In Progress"])
//!     .order_by(["priority DESC"])
//!     .run()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;

use tracing::{debug, instrument};

use crate::api::types::SearchResponse;
use crate::api::{ApiError, Client, HttpTransport, RequestOptions, Result, Transport, ALL_FIELDS};
use crate::issue::Issue;

/// A key or value emitted into a JQL clause.
#[derive(Debug, Clone, PartialEq)]
pub enum JqlValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for JqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JqlValue::Text(s) => f.write_str(s),
            JqlValue::Integer(n) => write!(f, "{n}"),
            JqlValue::Float(n) => write!(f, "{n}"),
            JqlValue::Bool(b) => write!(f, "{b}"),
            JqlValue::Null => f.write_str("null"),
        }
    }
}

impl From<&str> for JqlValue {
    fn from(s: &str) -> Self {
        JqlValue::Text(s.to_string())
    }
}

impl From<String> for JqlValue {
    fn from(s: String) -> Self {
        JqlValue::Text(s)
    }
}

impl From<&String> for JqlValue {
    fn from(s: &String) -> Self {
        JqlValue::Text(s.clone())
    }
}

impl From<bool> for JqlValue {
    fn from(b: bool) -> Self {
        JqlValue::Bool(b)
    }
}

impl From<f64> for JqlValue {
    fn from(n: f64) -> Self {
        JqlValue::Float(n)
    }
}

macro_rules! integer_values {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for JqlValue {
                fn from(n: $ty) -> Self {
                    JqlValue::Integer(i64::from(n))
                }
            }
        )*
    };
}

integer_values!(i32, i64, u32);

// Values past i64::MAX keep their digits as text.
macro_rules! wide_integer_values {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for JqlValue {
                fn from(n: $ty) -> Self {
                    i64::try_from(n)
                        .map_or_else(|_| JqlValue::Text(n.to_string()), JqlValue::Integer)
                }
            }
        )*
    };
}

wide_integer_values!(u64, usize);

/// A clause value that may be omitted.
///
/// Plain values are always present; `None` skips the clause. Pass
/// [`JqlValue::Null`] to emit a literal `null`.
pub trait IntoClauseValue {
    fn into_clause_value(self) -> Option<JqlValue>;
}

macro_rules! clause_values {
    ($($ty:ty),*) => {
        $(
            impl IntoClauseValue for $ty {
                fn into_clause_value(self) -> Option<JqlValue> {
                    Some(self.into())
                }
            }

            impl IntoClauseValue for Option<$ty> {
                fn into_clause_value(self) -> Option<JqlValue> {
                    self.map(Into::into)
                }
            }
        )*
    };
}

clause_values!(&str, String, &String, bool, f64, i32, i64, u32, u64, usize);

impl IntoClauseValue for JqlValue {
    fn into_clause_value(self) -> Option<JqlValue> {
        Some(self)
    }
}

impl IntoClauseValue for Option<JqlValue> {
    fn into_clause_value(self) -> Option<JqlValue> {
        self
    }
}

/// Quote a JQL value.
///
/// A string is wrapped in double quotes when it has a space after its first
/// character and contains no double quote, so already quoted text is safe to
/// pass again. Blank strings and everything else come back unchanged.
pub fn quote(value: impl Into<JqlValue>) -> JqlValue {
    match value.into() {
        JqlValue::Text(s) if needs_quotes(&s) => JqlValue::Text(format!("\"{s}\"")),
        other => other,
    }
}

fn needs_quotes(s: &str) -> bool {
    !s.trim().is_empty() && s.find(' ').is_some_and(|i| i > 0) && !s.contains('"')
}

fn equals(key: &str, value: JqlValue) -> String {
    format!("{} = {}", quote(key), quote(value))
}

/// A JQL search bound to a [`Client`].
///
/// Builder methods take and return the search by value. Clauses render in
/// call order and are joined with `AND`.
pub struct Search<'a, T = HttpTransport> {
    client: &'a Client<T>,
    clauses: Vec<String>,
    order: Vec<String>,
    raw_query: Option<String>,
}

impl<'a, T: Transport> Search<'a, T> {
    pub fn new(client: &'a Client<T>) -> Self {
        Self {
            client,
            clauses: Vec::new(),
            order: Vec::new(),
            raw_query: None,
        }
    }

    /// Add `key = value`. Nothing is added when `value` is `None`.
    pub fn where_eq(mut self, key: &str, value: impl IntoClauseValue) -> Self {
        if let Some(value) = value.into_clause_value() {
            self.clauses.push(equals(key, value));
        }
        self
    }

    /// Add `key in (v1, v2, ...)`, or `key in v` for a single value.
    pub fn where_in<I>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<JqlValue>,
    {
        let mut values: Vec<String> = values
            .into_iter()
            .map(|v| quote(v).to_string())
            .collect();

        let rendered = match values.len() {
            0 => return self,
            1 => values.remove(0),
            _ => format!("({})", values.join(", ")),
        };
        self.clauses.push(format!("{} in {}", quote(key), rendered));
        self
    }

    /// Add `(k1 = v1 OR k2 = v2 ...)` as one clause.
    ///
    /// Pairs without a value are skipped; if none remain nothing is added.
    pub fn any<K, V, I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoClauseValue,
    {
        let alternatives: Vec<String> = pairs
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .into_clause_value()
                    .map(|value| equals(key.as_ref(), value))
            })
            .collect();

        if !alternatives.is_empty() {
            self.clauses.push(format!("({})", alternatives.join(" OR ")));
        }
        self
    }

    /// Append ordering terms such as `"priority DESC"`.
    pub fn order_by<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.order.extend(terms.into_iter().map(Into::into));
        self
    }

    /// Use `query` verbatim, ignoring the accumulated clauses until cleared.
    pub fn set_query(mut self, query: impl Into<String>) -> Self {
        self.raw_query = Some(query.into());
        self
    }

    /// Drop a query set with [`set_query`](Self::set_query).
    pub fn clear_query(mut self) -> Self {
        self.raw_query = None;
        self
    }

    /// The JQL this search will run.
    pub fn query(&self) -> String {
        if let Some(raw) = &self.raw_query {
            return raw.clone();
        }

        let mut jql = self.clauses.join(" AND ");
        if !self.order.is_empty() {
            jql.push_str(" ORDER BY ");
            jql.push_str(&self.order.join(", "));
        }
        jql
    }

    /// Run the search and map the first page of results.
    ///
    /// # Errors
    ///
    /// Propagates any request error. A response without an `issues` list is
    /// an `InvalidResponse`.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<Vec<Issue>> {
        let jql = self.query();
        debug!(jql = %jql, "Running search");

        let options = RequestOptions::get()
            .query("jql", jql)
            .query("fields", ALL_FIELDS);
        let json = self.client.request("search", options).await?;

        let response: SearchResponse = serde_json::from_value(json)
            .map_err(|e| ApiError::InvalidResponse(format!("malformed search response: {}", e)))?;
        debug!(
            count = response.issues.len(),
            total = ?response.total,
            "Search returned"
        );

        response
            .issues
            .into_iter()
            .map(|json| Issue::from_json(json, self.client.config()))
            .collect()
    }
}

impl<T> fmt::Debug for Search<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Search")
            .field("clauses", &self.clauses)
            .field("order", &self.order)
            .field("raw_query", &self.raw_query)
            .finish_non_exhaustive()
    }
}
