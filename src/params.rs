//! Request parameter encoding
//!
//! Turns the typed option records used by query, update and statement
//! operations into a flat, ordered set of string-keyed parameters.
//! Absent options never produce a key.
//!
//! Wire rules:
//! - list-valued graph URIs expand to `key`, `key1`, `key2`, ...
//! - variable bindings become `$name` keys
//! - statement contexts are joined into one comma-separated value

use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;

/// Context value selecting the default graph
pub const DEFAULT_CONTEXT: &str = "null";

/// A single parameter value; stringified by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        ParamValue::Str(s.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<u32> for ParamValue {
    fn from(i: u32) -> Self {
        ParamValue::Int(i64::from(i))
    }
}

impl From<u64> for ParamValue {
    fn from(i: u64) -> Self {
        ParamValue::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

/// Flat parameter set, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(IndexMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Set a parameter, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Set a parameter only when a value is present
    pub fn insert_opt<V: Into<ParamValue>>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Expand a URI list into `key`, `key1`, `key2`, ...
    pub fn insert_indexed(&mut self, key: &str, values: &[String]) {
        for (i, value) in values.iter().enumerate() {
            if i == 0 {
                self.insert(key, value);
            } else {
                self.insert(format!("{}{}", key, i), value);
            }
        }
    }

    /// Add SPARQL variable bindings as `$name` parameters
    pub fn insert_bindings(&mut self, bindings: &BTreeMap<String, String>) {
        for (name, value) in bindings {
            let key = if name.starts_with('$') {
                name.clone()
            } else {
                format!("${}", name)
            };
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Remove a parameter, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Stringified key/value pairs for the query string
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0.iter().map(|(k, v)| (k.clone(), v.to_string())).collect()
    }
}

impl Extend<(String, ParamValue)> for Params {
    fn extend<I: IntoIterator<Item = (String, ParamValue)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = indexmap::map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn join_contexts(contexts: &[String]) -> Option<String> {
    if contexts.is_empty() {
        None
    } else {
        Some(contexts.join(","))
    }
}

/// Options for SPARQL queries. Unset fields use the server default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Include inferred statements
    pub infer: Option<bool>,
    /// Server-side query timeout in seconds
    pub timeout: Option<u32>,
    pub default_graph_uri: Vec<String>,
    pub named_graph_uri: Vec<String>,
    /// Variable name → N-Triples encoded value
    pub bindings: BTreeMap<String, String>,
    pub distinct: Option<bool>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn infer(mut self, infer: bool) -> Self {
        self.infer = Some(infer);
        self
    }

    pub fn timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn default_graph(mut self, uri: impl Into<String>) -> Self {
        self.default_graph_uri.push(uri.into());
        self
    }

    pub fn named_graph(mut self, uri: impl Into<String>) -> Self {
        self.named_graph_uri.push(uri.into());
        self
    }

    pub fn bind(mut self, variable: impl Into<String>, value: impl fmt::Display) -> Self {
        self.bindings.insert(variable.into(), value.to_string());
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = Some(distinct);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Encode into wire parameters, with the query text under `query`
    pub fn encode(&self, query: Option<&str>) -> Params {
        let mut params = Params::new();
        params.insert_opt("query", query);
        params.insert_opt("infer", self.infer);
        params.insert_opt("timeout", self.timeout);
        params.insert_indexed("default-graph-uri", &self.default_graph_uri);
        params.insert_indexed("named-graph-uri", &self.named_graph_uri);
        params.insert_bindings(&self.bindings);
        params.insert_opt("distinct", self.distinct);
        params.insert_opt("limit", self.limit);
        params.insert_opt("offset", self.offset);
        params
    }
}

/// Options for SPARQL updates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOptions {
    pub infer: Option<bool>,
    /// Server-side execution timeout in seconds
    pub timeout: Option<u32>,
    pub using_graph_uri: Vec<String>,
    pub using_named_graph_uri: Vec<String>,
    pub bindings: BTreeMap<String, String>,
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn infer(mut self, infer: bool) -> Self {
        self.infer = Some(infer);
        self
    }

    pub fn timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn using_graph(mut self, uri: impl Into<String>) -> Self {
        self.using_graph_uri.push(uri.into());
        self
    }

    pub fn using_named_graph(mut self, uri: impl Into<String>) -> Self {
        self.using_named_graph_uri.push(uri.into());
        self
    }

    pub fn bind(mut self, variable: impl Into<String>, value: impl fmt::Display) -> Self {
        self.bindings.insert(variable.into(), value.to_string());
        self
    }

    /// Encode into wire parameters, with the update text under `update`
    pub fn encode(&self, update: Option<&str>) -> Params {
        let mut params = Params::new();
        params.insert_opt("update", update);
        params.insert_opt("infer", self.infer);
        params.insert_opt("timeout", self.timeout);
        params.insert_indexed("using-graph-uri", &self.using_graph_uri);
        params.insert_indexed("using-named-graph-uri", &self.using_named_graph_uri);
        params.insert_bindings(&self.bindings);
        params
    }
}

/// Statement pattern used by get, delete, export and transaction reads.
///
/// Terms are N-Triples encoded: `<http://ex.org/s>`, `"lit"@en`, `_:b0`.
/// Anything implementing `Display` in N-Triples form works, including
/// `oxrdf` terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementFilter {
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
    pub context: Vec<String>,
    pub infer: Option<bool>,
}

impl StatementFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, term: impl fmt::Display) -> Self {
        self.subject = Some(term.to_string());
        self
    }

    pub fn predicate(mut self, term: impl fmt::Display) -> Self {
        self.predicate = Some(term.to_string());
        self
    }

    pub fn object(mut self, term: impl fmt::Display) -> Self {
        self.object = Some(term.to_string());
        self
    }

    /// Restrict to a context; may be called repeatedly
    pub fn context(mut self, term: impl fmt::Display) -> Self {
        self.context.push(term.to_string());
        self
    }

    pub fn infer(mut self, infer: bool) -> Self {
        self.infer = Some(infer);
        self
    }

    pub fn encode(&self) -> Params {
        let mut params = Params::new();
        params.insert_opt("subj", self.subject.as_deref());
        params.insert_opt("pred", self.predicate.as_deref());
        params.insert_opt("obj", self.object.as_deref());
        params.insert_opt("context", join_contexts(&self.context));
        params.insert_opt("infer", self.infer);
        params
    }
}

/// Options for uploading RDF data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddOptions {
    /// Target contexts (N-Triples encoded)
    pub context: Vec<String>,
    /// Base URI for resolving relative IRIs in the payload
    pub base_uri: Option<String>,
}

impl AddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(mut self, term: impl fmt::Display) -> Self {
        self.context.push(term.to_string());
        self
    }

    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    pub fn encode(&self) -> Params {
        let mut params = Params::new();
        params.insert_opt("context", join_contexts(&self.context));
        params.insert_opt("baseURI", self.base_uri.as_deref());
        params
    }
}

/// Encode an optional context list (size, clear)
pub fn encode_contexts(contexts: &[String]) -> Params {
    let mut params = Params::new();
    params.insert_opt("context", join_contexts(contexts));
    params
}
