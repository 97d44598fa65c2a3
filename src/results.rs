//! SPARQL query results (application/sparql-results+json)

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A bound RDF term in a result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BindingValue {
    /// IRI
    #[serde(rename = "uri")]
    Uri { value: String },

    /// Literal with optional language tag or datatype
    #[serde(rename = "literal", alias = "typed-literal")]
    Literal {
        value: String,
        #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },

    /// Blank node
    #[serde(rename = "bnode")]
    BlankNode { value: String },
}

impl BindingValue {
    /// Lexical value regardless of term kind
    pub fn as_str(&self) -> &str {
        match self {
            BindingValue::Uri { value }
            | BindingValue::BlankNode { value }
            | BindingValue::Literal { value, .. } => value,
        }
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, BindingValue::Uri { .. })
    }
}

/// N-Triples form, usable as a variable binding or statement filter term
impl fmt::Display for BindingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingValue::Uri { value } => write!(f, "<{}>", value),
            BindingValue::BlankNode { value } => write!(f, "_:{}", value),
            BindingValue::Literal { value, language, datatype } => {
                write!(f, "\"{}\"", escape_literal(value))?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)
                } else if let Some(datatype) = datatype {
                    write!(f, "^^<{}>", datatype)
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Query solution (variable bindings)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuerySolution {
    pub bindings: HashMap<String, BindingValue>,
}

impl QuerySolution {
    pub fn get(&self, variable: &str) -> Option<&BindingValue> {
        self.bindings.get(variable)
    }

    /// Lexical value of a binding
    pub fn get_str(&self, variable: &str) -> Option<&str> {
        self.bindings.get(variable).map(BindingValue::as_str)
    }
}

/// Tabular result of a SELECT query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectResults {
    pub variables: Vec<String>,
    pub rows: Vec<QuerySolution>,
}

impl SelectResults {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lexical values of one variable, in row order, skipping unbound rows
    pub fn column(&self, variable: &str) -> Vec<&str> {
        self.rows.iter().filter_map(|row| row.get_str(variable)).collect()
    }
}

#[derive(Deserialize)]
struct RawHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Deserialize)]
struct RawBindings {
    bindings: Vec<QuerySolution>,
}

#[derive(Deserialize)]
struct RawSelect {
    head: RawHead,
    results: RawBindings,
}

#[derive(Deserialize)]
struct RawBoolean {
    boolean: bool,
}

/// Parse a SELECT result document
pub fn parse_select(body: &str) -> ClientResult<SelectResults> {
    let raw: RawSelect = serde_json::from_str(body)?;
    Ok(SelectResults {
        variables: raw.head.vars,
        rows: raw.results.bindings,
    })
}

/// Parse an ASK result document (`{"head": {}, "boolean": true}`)
pub fn parse_boolean(body: &str) -> ClientResult<bool> {
    let raw: RawBoolean = serde_json::from_str(body)?;
    Ok(raw.boolean)
}

/// Parse a plain-text statement count
pub fn parse_size(body: &str) -> ClientResult<u64> {
    body.trim()
        .parse::<u64>()
        .map_err(|_| ClientError::InvalidSize {
            body: body.to_string(),
        })
}
