//! Data models for server-reported resources

use crate::results::SelectResults;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Backing store used when no type is given at creation
pub const DEFAULT_STORE_TYPE: &str = "openrdf:MemoryStore";

/// Repository as listed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub id: String,
    pub title: String,
    pub uri: String,
    pub readable: bool,
    pub writable: bool,
}

impl RepositoryDescriptor {
    /// Decode the rows of a repository listing. Rows without an id are skipped.
    pub fn from_results(results: &SelectResults) -> Vec<Self> {
        results
            .rows
            .iter()
            .filter_map(|row| {
                let id = row.get_str("id")?.to_string();
                Some(Self {
                    id,
                    title: row.get_str("title").unwrap_or_default().to_string(),
                    uri: row.get_str("uri").unwrap_or_default().to_string(),
                    readable: row.get_str("readable") == Some("true"),
                    writable: row.get_str("writable") == Some("true"),
                })
            })
            .collect()
    }
}

/// Decode a namespace listing into prefix → namespace IRI
pub fn namespaces_from_results(results: &SelectResults) -> HashMap<String, String> {
    results
        .rows
        .iter()
        .filter_map(|row| {
            Some((
                row.get_str("prefix")?.to_string(),
                row.get_str("namespace")?.to_string(),
            ))
        })
        .collect()
}

/// Decode a context listing, keeping server order
pub fn contexts_from_results(results: &SelectResults) -> Vec<String> {
    results
        .column("contextID")
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Options for creating a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOptions {
    /// Human-readable label
    pub title: Option<String>,
    /// Sail type, e.g. "openrdf:NativeStore"
    pub store_type: Option<String>,
    /// Complete Turtle configuration; overrides title and store type
    pub config: Option<String>,
}

impl RepositoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn store_type(mut self, store_type: impl Into<String>) -> Self {
        self.store_type = Some(store_type.into());
        self
    }

    pub fn config(mut self, turtle: impl Into<String>) -> Self {
        self.config = Some(turtle.into());
        self
    }

    /// Turtle configuration sent to the server
    pub fn to_turtle(&self, id: &str) -> String {
        if let Some(config) = &self.config {
            return config.clone();
        }

        let title = self.title.as_deref().unwrap_or(id);
        let store_type = self.store_type.as_deref().unwrap_or(DEFAULT_STORE_TYPE);
        format!(
            "@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#>.\n\
             @prefix rep: <http://www.openrdf.org/config/repository#>.\n\
             @prefix sr: <http://www.openrdf.org/config/repository/sail#>.\n\
             @prefix sail: <http://www.openrdf.org/config/sail#>.\n\
             \n\
             [] a rep:Repository ;\n   \
                rep:repositoryID \"{}\" ;\n   \
                rdfs:label \"{}\" ;\n   \
                rep:repositoryImpl [\n      \
                   rep:repositoryType \"openrdf:SailRepository\" ;\n      \
                   sr:sailImpl [\n         \
                      sail:sailType \"{}\"\n      \
                   ]\n   \
                ].\n",
            escape(id),
            escape(title),
            escape(store_type)
        )
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
